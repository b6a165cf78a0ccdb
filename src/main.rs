fn main() {
    pkgfacts::run_cli();
}
