//! `aaconsult` — terminal client for the A&A Consult Excel catalog.
//!
//! # Usage
//!
//! ```
//! aaconsult                                  # browse the catalog
//! aaconsult list --featured
//! aaconsult show 12
//! aaconsult request --product 12 --name "Ana Popescu" \
//!   --email ana@example.com --message "I would like this file, please."
//! aaconsult --config ~/.config/aaconsult/config.toml --log-file aaconsult.log
//! ```

mod app;
mod form;
mod ui;

use std::{
  fs::File,
  io,
  path::{Path, PathBuf},
  sync::Mutex,
  time::Duration,
};

use aaconsult_client::{ApiClient, ApiConfig, DEFAULT_BASE_URL};
use aaconsult_core::{
  Error,
  catalog,
  contact::Field,
  flow::{ContactRequestFlow, RequestOutcome, SuccessPolicy},
  product::Product,
};
use anyhow::{Context, Result, bail};
use app::App;
use clap::{Parser, Subcommand};
use crossterm::{
  event::{self, Event, KeyEventKind},
  execute,
  terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode,
    enable_raw_mode,
  },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
  name = "aaconsult",
  version,
  about = "Browse the A&A Consult Excel catalog and request files"
)]
struct Args {
  /// Path to a TOML config file (url, timeout_secs, strict, log_file).
  #[arg(short, long, value_name = "FILE")]
  config: Option<PathBuf>,

  /// Base URL of the server (default: https://server.aaconsl.com).
  #[arg(long, env = "AACONSULT_URL")]
  url: Option<String>,

  /// HTTP timeout in seconds.
  #[arg(long, env = "AACONSULT_TIMEOUT_SECS")]
  timeout_secs: Option<u64>,

  /// Treat a non-2xx answer to a contact request as a failure.
  #[arg(long)]
  strict: bool,

  /// Append logs to this file. The browser only logs when this is set.
  #[arg(long, env = "AACONSULT_LOG_FILE", value_name = "FILE")]
  log_file: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Interactive catalog browser (the default).
  Browse,

  /// Print the catalog, newest first.
  List {
    /// Only the newest few, as on the home page.
    #[arg(long)]
    featured: bool,

    /// Print JSON instead of text.
    #[arg(long)]
    json: bool,
  },

  /// Print one product.
  Show {
    id: i64,

    #[arg(long)]
    json: bool,
  },

  /// Send a contact request for a product.
  Request {
    #[arg(long, value_name = "ID")]
    product: i64,

    #[arg(long)]
    name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    message: String,
  },
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:          String,
  timeout_secs: Option<u64>,
  #[serde(default)]
  strict:       bool,
  log_file:     Option<PathBuf>,
}

/// Settings after merging flags, config file and defaults.
struct Settings {
  api:      ApiConfig,
  policy:   SuccessPolicy,
  log_file: Option<PathBuf>,
}

impl Settings {
  /// CLI flags override the config file, which overrides defaults.
  fn resolve(args: &Args, file: ConfigFile) -> Self {
    let defaults = ApiConfig::default();
    let base_url = args
      .url
      .clone()
      .or_else(|| (!file.url.is_empty()).then(|| file.url.clone()))
      .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
    let timeout = args
      .timeout_secs
      .or(file.timeout_secs)
      .map(Duration::from_secs)
      .unwrap_or(defaults.timeout);
    let policy = if args.strict || file.strict {
      SuccessPolicy::Strict
    } else {
      SuccessPolicy::Coarse
    };

    Self {
      api: ApiConfig { base_url, timeout },
      policy,
      log_file: args.log_file.clone().or(file.log_file),
    }
  }
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };
  let settings = Settings::resolve(&args, file_cfg);

  let interactive = matches!(args.command, None | Some(Command::Browse));
  init_tracing(settings.log_file.as_deref(), interactive)?;

  let client = ApiClient::new(settings.api.clone())?;

  match args.command {
    None | Some(Command::Browse) => browse(client, settings.policy).await,
    Some(Command::List { featured, json }) => {
      list(&client, featured, json).await
    }
    Some(Command::Show { id, json }) => show(&client, id, json).await,
    Some(Command::Request {
      product,
      name,
      email,
      message,
    }) => {
      request(&client, settings.policy, product, [name, email, message]).await
    }
  }
}

/// Log to `log_file` if given, otherwise to stderr, except for the browser
/// which owns the terminal and stays silent without a file.
fn init_tracing(log_file: Option<&Path>, interactive: bool) -> Result<()> {
  let filter = EnvFilter::builder()
    .with_default_directive(LevelFilter::INFO.into())
    .from_env_lossy();

  match log_file {
    Some(path) => {
      let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    }
    None if !interactive => {
      tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    }
    None => {}
  }
  Ok(())
}

// ─── Subcommands ──────────────────────────────────────────────────────────────

async fn list(client: &ApiClient, featured: bool, json: bool) -> Result<()> {
  let mut products = client.list_products().await?;
  if featured {
    products = catalog::featured(products);
  } else {
    catalog::sort_newest_first(&mut products);
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&products)?);
    return Ok(());
  }
  for p in &products {
    println!("{:>5}  {}  {}", p.id, p.display_date(), p.name);
    if !p.summary.is_empty() {
      println!("       {}", p.summary);
    }
  }
  Ok(())
}

async fn show(client: &ApiClient, id: i64, json: bool) -> Result<()> {
  let product = client.get_product(id).await?;
  if json {
    println!("{}", serde_json::to_string_pretty(&product)?);
  } else {
    print_product(&product);
  }
  Ok(())
}

fn print_product(p: &Product) {
  println!("{}", p.name);
  println!("published  {}", p.display_date());
  println!("summary    {}", p.summary);
  println!("video      {}", p.embed_url());
  println!("thumbnail  {}", p.thumbnail_url());
  println!();
  println!("{}", p.description);
}

async fn request(
  client: &ApiClient,
  policy: SuccessPolicy,
  product_id: i64,
  [name, email, message]: [String; 3],
) -> Result<()> {
  let mut flow = ContactRequestFlow::new(product_id).with_policy(policy);
  flow.set(Field::Name, name)?;
  flow.set(Field::Email, email)?;
  flow.set(Field::Message, message)?;

  RequestReport::from_result(flow.run(client).await)?.finish()
}

/// What `aaconsult request` tells the user once the flow has run.
#[derive(Debug, PartialEq, Eq)]
enum RequestReport {
  /// The request completed.
  Sent,
  /// Delivery did not succeed.
  Failed(RequestOutcome),
  /// One `--field: message` line per rejected field, in form order.
  Invalid(Vec<String>),
}

impl RequestReport {
  /// Errors other than validation are not the visitor's to fix and are
  /// passed through.
  fn from_result(result: aaconsult_core::Result<RequestOutcome>) -> Result<Self> {
    match result {
      Ok(RequestOutcome::Succeeded) => Ok(Self::Sent),
      Ok(outcome) => Ok(Self::Failed(outcome)),
      Err(Error::Validation(errors)) => Ok(Self::Invalid(
        errors
          .iter()
          .map(|(field, msg)| format!("  --{field}: {msg}"))
          .collect(),
      )),
      Err(e) => Err(e.into()),
    }
  }

  /// Print the report. Anything but [`RequestReport::Sent`] is an error, so
  /// the process exits non-zero.
  fn finish(self) -> Result<()> {
    match self {
      Self::Sent => {
        println!("{}", form::SUCCESS_MESSAGE);
        Ok(())
      }
      Self::Failed(outcome) => {
        eprintln!("{}", form::FAILURE_MESSAGE);
        bail!("contact request {outcome}")
      }
      Self::Invalid(lines) => {
        for line in &lines {
          eprintln!("{line}");
        }
        bail!("invalid contact form")
      }
    }
  }
}

// ─── Browser ──────────────────────────────────────────────────────────────────

async fn browse(client: ApiClient, policy: SuccessPolicy) -> Result<()> {
  let mut app = App::new(client, policy);

  // Set up the terminal.
  enable_raw_mode().context("enabling raw mode")?;
  let mut stdout = io::stdout();
  execute!(stdout, EnterAlternateScreen)
    .context("entering alternate screen")?;
  let backend = CrosstermBackend::new(stdout);
  let mut terminal = Terminal::new(backend).context("creating terminal")?;

  // Load initial data; restore the terminal even on error.
  let run_result = match app.load_products().await {
    Ok(()) => run_event_loop(&mut terminal, &mut app).await,
    Err(e) => Err(e),
  };

  disable_raw_mode().ok();
  execute!(terminal.backend_mut(), LeaveAlternateScreen).ok();
  terminal.show_cursor().ok();

  run_result
}

// ─── Event loop ───────────────────────────────────────────────────────────────

async fn run_event_loop(
  terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
  app: &mut App,
) -> Result<()> {
  loop {
    app.tick();
    terminal.draw(|f| ui::draw(f, app)).context("drawing frame")?;

    // Poll for an event, yielding control to tokio while waiting.
    let maybe_event = tokio::task::block_in_place(|| {
      if event::poll(Duration::from_millis(50))? {
        Ok::<_, io::Error>(Some(event::read()?))
      } else {
        Ok(None)
      }
    })?;

    match maybe_event {
      Some(Event::Key(key)) if key.kind == KeyEventKind::Press => {
        if !app.handle_key(key).await {
          break;
        }
      }
      // Resizes are picked up by the next draw.
      _ => {}
    }
  }

  Ok(())
}
