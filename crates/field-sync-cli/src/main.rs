fn main() -> anyhow::Result<()> {
    field_sync_cli::cli::main()
}
