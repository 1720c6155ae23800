fn main() -> anyhow::Result<()> {
    riskseg_cli::run()
}
