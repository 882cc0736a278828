fn main() -> anyhow::Result<()> {
    mastery_service::run()
}
