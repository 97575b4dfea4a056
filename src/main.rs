fn main() -> anyhow::Result<()> {
    pollster::block_on(kiss_surface::run())
}
