fn main() {
    std::process::exit(statlab::cli::main());
}
