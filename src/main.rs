fn main() -> anyhow::Result<()> {
    swipectl::logging::init();
    swipectl::cli::run()
}
