//! Binary that emits the command-line options table as markdown on stdout.

fn main() {
    print!("{}", salesdash_cli::render_options_markdown());
}
