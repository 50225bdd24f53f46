use anyhow::{bail, Context, Result};
use resultkit::{config::Settings, normalize_body, plan_chart, write_csv_file, ChartSpec};
use std::{
    env, fs,
    io::{self, Read},
    path::PathBuf,
    process,
};
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "Usage: resultkit <payload-file|-> [--chart <hint.json>] [--csv [<out.csv>]]";

#[derive(Debug, Default)]
struct Args {
    payload: String,
    chart: Option<PathBuf>,
    /// `Some(None)` → export with the configured filename.
    csv: Option<Option<String>>,
}

fn parse_args(raw: &[String]) -> Result<Args> {
    let mut args = Args::default();
    let mut it = raw.iter().peekable();

    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--chart" => {
                let path = it.next().context("--chart needs a file")?;
                args.chart = Some(PathBuf::from(path));
            }
            "--csv" => {
                let name = it.next_if(|next| !next.starts_with("--")).cloned();
                args.csv = Some(name);
            }
            other if args.payload.is_empty() => args.payload = other.to_string(),
            other => bail!("unexpected argument `{}`", other),
        }
    }

    if args.payload.is_empty() {
        bail!("missing payload file");
    }
    Ok(args)
}

fn read_payload(source: &str) -> Result<String> {
    if source == "-" {
        let mut body = String::new();
        io::stdin()
            .read_to_string(&mut body)
            .context("reading payload from stdin")?;
        Ok(body)
    } else {
        fs::read_to_string(source).with_context(|| format!("reading payload {}", source))
    }
}

fn main() -> Result<()> {
    let settings = Settings::from_env();

    // ─── 1) init logging ─────────────────────────────────────────────
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.log_filter));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .init();

    let raw: Vec<String> = env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            process::exit(2);
        }
    };

    // ─── 2) normalize ────────────────────────────────────────────────
    let body = read_payload(&args.payload)?;
    let table = normalize_body(&body);
    info!(columns = table.columns().len(), rows = table.len(), "normalized payload");
    println!("{}", serde_json::to_string_pretty(&table)?);

    // ─── 3) chart ────────────────────────────────────────────────────
    if let Some(hint_path) = &args.chart {
        let text = fs::read_to_string(hint_path)
            .with_context(|| format!("reading chart hint {:?}", hint_path))?;
        let hint: Option<ChartSpec> =
            serde_json::from_str(&text).context("parsing chart hint")?;

        match plan_chart(&table, hint.as_ref()) {
            Ok(plan) => {
                info!(kind = plan.spec.kind.as_str(), points = plan.dataset.len(), "chart selected");
                println!("{}", serde_json::to_string_pretty(&plan)?);
            }
            Err(e) => {
                error!("{}", e);
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    }

    // ─── 4) export ───────────────────────────────────────────────────
    if let Some(name) = args.csv {
        let filename = name.unwrap_or_else(|| settings.export_filename.clone());
        let path = write_csv_file(&table, &settings.export_dir, &filename)?;
        eprintln!("wrote {}", path.display());
    }

    Ok(())
}
