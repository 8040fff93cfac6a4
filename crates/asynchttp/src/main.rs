use std::process;
use std::sync::mpsc;
use std::time::Duration;

use asynchttp::{AsyncHttpClient, ClientConfig, DispatchError, Outcome, Response};

#[derive(Debug, PartialEq)]
struct Args {
    urls: Vec<String>,
    /// `None` keeps the value from the environment.
    concurrency: Option<usize>,
    timeout: Option<Duration>,
    head: bool,
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let args = match parse_args(&args) {
        Ok(v) => v,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("error: {msg}");
                eprintln!();
            }
            eprintln!("Usage: asynchttp-fetch <url>... [--concurrency N] [--timeout SECS] [--head]");
            eprintln!();
            eprintln!("Arguments:");
            eprintln!("  <url>...             URLs to fetch");
            eprintln!();
            eprintln!("Options:");
            eprintln!("  --concurrency <n>    Max requests in flight, 0 for unlimited [default: $ASYNCHTTP_CONCURRENCY or 0]");
            eprintln!("  --timeout <secs>     Per-request timeout in seconds [default: $ASYNCHTTP_TIMEOUT]");
            eprintln!("  --head               Send HEAD instead of GET");
            process::exit(2);
        }
    };

    asynchttp::logging::init_tracing();

    if run(args) > 0 {
        process::exit(1);
    }
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut urls = Vec::new();
    let mut concurrency = None;
    let mut timeout = None;
    let mut head = false;

    let mut i = 1; // skip argv[0]
    while i < args.len() {
        match args[i].as_str() {
            "--concurrency" | "-c" => {
                i += 1;
                let value = args.get(i).ok_or("--concurrency requires a value")?;
                concurrency = Some(
                    value
                        .parse()
                        .map_err(|_| format!("invalid concurrency '{value}'"))?,
                );
            }
            "--timeout" => {
                i += 1;
                let value = args.get(i).ok_or("--timeout requires a value")?;
                let secs: f64 = value
                    .parse()
                    .ok()
                    .filter(|s: &f64| s.is_finite() && *s > 0.0)
                    .ok_or_else(|| format!("invalid timeout '{value}'"))?;
                timeout = Some(Duration::from_secs_f64(secs));
            }
            "--head" => head = true,
            "--help" | "-h" => return Err(String::new()),
            arg if arg.starts_with('-') => return Err(format!("unknown flag: {arg}")),
            arg => urls.push(arg.to_string()),
        }
        i += 1;
    }

    if urls.is_empty() {
        return Err("missing required argument: <url>".to_string());
    }

    Ok(Args {
        urls,
        concurrency,
        timeout,
        head,
    })
}

/// Overlay flags given on the command line onto `base`.
fn apply_flags(args: &Args, mut base: ClientConfig) -> ClientConfig {
    if let Some(concurrency) = args.concurrency {
        base = base.with_concurrency(concurrency);
    }
    if let Some(timeout) = args.timeout {
        base = base.with_timeout(timeout);
    }
    base
}

/// Fetch every URL and print results as they arrive. Returns the failure count.
fn run(args: Args) -> usize {
    let client = AsyncHttpClient::new(apply_flags(&args, ClientConfig::default()));

    let (tx, rx) = mpsc::channel::<(String, Outcome<Response>)>();
    for url in &args.urls {
        let tx = tx.clone();
        let tag = url.clone();
        let callback = move |outcome: Outcome<Response>| {
            let _ = tx.send((tag, outcome));
        };
        if args.head {
            client.head(url.as_str(), callback);
        } else {
            client.get(url.as_str(), callback);
        }
    }
    drop(tx);

    let mut failures = 0;
    for (url, outcome) in rx {
        match outcome {
            Ok(response) => println!("{} {}", response.status().as_u16(), url),
            Err(e) => {
                failures += 1;
                println!("error {}: {}", url, describe(&e));
            }
        }
    }
    failures
}

fn describe(err: &DispatchError) -> String {
    match err {
        DispatchError::Transport(e) => e.to_string(),
        other => other.to_string(),
    }
}
