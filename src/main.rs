fn main() {
    azup::app::cli::run();
}
