//! Mock menu program for integration testing
//!
//! Behaves like a small interactive test runner: prints a banner and the
//! menu prompt, runs "tests" for numeric choices, and exits on "0". Flags make
//! it misbehave in the ways the driver has to cope with.

use clap::Parser;
use std::io::{BufRead, Write};

const MARKER: &str = "> Run test (1 ~ 5) or exit (0):";

#[derive(Parser)]
struct Args {
    /// Exit code used when "0" is received
    #[arg(long, default_value_t = 0)]
    exit_code: i32,

    /// Surround the prompt with whitespace
    #[arg(long)]
    pad: bool,

    /// Terminate lines with \r\n
    #[arg(long)]
    crlf: bool,

    /// Never print the prompt; wait for stdin to close
    #[arg(long)]
    silent: bool,

    /// Exit with code 3 right after the banner
    #[arg(long)]
    close_early: bool,

    /// Close stdin, print the prompt and exit without reading anything
    #[arg(long)]
    close_stdin: bool,

    /// Abort (SIGABRT) instead of exiting when "0" is received
    #[arg(long)]
    abort: bool,

    /// Write this many lines to stderr before starting
    #[arg(long, default_value_t = 0)]
    stderr_lines: usize,

    /// Print this many filler lines before each prompt
    #[arg(long, default_value_t = 0)]
    noise: usize,
}

fn main() {
    let args = Args::parse();
    let eol = if args.crlf { "\r\n" } else { "\n" };
    if args.close_stdin {
        close_stdin();
    }

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    if args.stderr_lines > 0 {
        let stderr = std::io::stderr();
        let mut err = stderr.lock();
        for i in 0..args.stderr_lines {
            writeln!(err, "diagnostic line {} of {}", i + 1, args.stderr_lines).ok();
        }
    }

    write!(out, "Enter value:{}", eol).ok();
    out.flush().ok();

    if args.close_early {
        std::process::exit(3);
    }

    if args.close_stdin {
        prompt(&mut out, &args, eol);
        std::process::exit(args.exit_code);
    }

    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();

    if args.silent {
        // Swallow input until the driver goes away
        while let Some(Ok(_)) = lines.next() {}
        std::process::exit(0);
    }

    prompt(&mut out, &args, eol);

    while let Some(Ok(line)) = lines.next() {
        match line.trim() {
            "0" => {
                out.flush().ok();
                if args.abort {
                    std::process::abort();
                }
                std::process::exit(args.exit_code);
            }
            choice => {
                write!(out, "Running test {}...{}", choice, eol).ok();
                prompt(&mut out, &args, eol);
            }
        }
    }

    std::process::exit(args.exit_code);
}

fn prompt<W: Write>(out: &mut W, args: &Args, eol: &str) {
    for i in 0..args.noise {
        write!(out, "  progress {}{}", i, eol).ok();
    }
    if args.pad {
        write!(out, "  {}  {}", MARKER, eol).ok();
    } else {
        write!(out, "{}{}", MARKER, eol).ok();
    }
    out.flush().ok();
}

/// Drop the read end of the stdin pipe so further writes from the driver fail
#[cfg(unix)]
fn close_stdin() {
    use std::os::unix::io::FromRawFd;

    // SAFETY: fd 0 is not used again in this process
    drop(unsafe { std::fs::File::from_raw_fd(0) });
}

#[cfg(not(unix))]
fn close_stdin() {}
