fn main() {
    bbl::run_cli();
}
