//! Binary that emits command-line options markdown to stdout.

fn main() {
    print!("{}", trendlens_cli::render_options_markdown());
}
