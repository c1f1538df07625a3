fn main() -> anyhow::Result<()> {
    regc_driver::main()
}
