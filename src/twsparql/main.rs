mod cli;

fn main() {
    let code = cli::run(std::env::args_os());
    std::process::exit(code);
}
