fn main() -> anyhow::Result<()> {
    fbx_inspect::internal_main()
}
