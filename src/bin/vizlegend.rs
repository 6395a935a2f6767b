use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use vizlegend::legend::calcs;
use vizlegend::models::{CreateLibraryPanelCommand, PatchLibraryPanelCommand};
use vizlegend::{LibraryPanel, Role, SignedInUser, VizLegendOptions, storage};

#[derive(Parser, Debug)]
#[command(
    name = "vizlegend",
    version,
    about = "Inspect legend options and manage library panels"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Work with legend options JSON.
    #[command(subcommand)]
    Legend(LegendCommand),
    /// Manage the library panel store.
    Panels(PanelsArgs),
}

#[derive(Subcommand, Debug)]
enum LegendCommand {
    /// Parse a legend options file and print a summary.
    Check {
        /// JSON file holding `{"calcs": [...], "displayMode": ..., "placement": ...}`
        file: PathBuf,
        /// Also reject unknown or duplicate calculation ids.
        #[arg(long, default_value_t = false)]
        strict: bool,
    },
    /// Print the default legend options as JSON.
    Default,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RoleArg {
    Viewer,
    Editor,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(r: RoleArg) -> Self {
        match r {
            RoleArg::Viewer => Role::Viewer,
            RoleArg::Editor => Role::Editor,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Args, Debug)]
struct PanelsArgs {
    /// Store file (default: <data dir>/vizlegend/library_panels.json)
    #[arg(long)]
    store: Option<PathBuf>,
    /// Organization of the acting user.
    #[arg(long, default_value_t = 1)]
    org: i64,
    /// Id of the acting user.
    #[arg(long, default_value_t = 1)]
    user_id: i64,
    /// Login of the acting user.
    #[arg(long, default_value = "admin")]
    login: String,
    /// Role of the acting user.
    #[arg(long, value_enum, default_value_t = RoleArg::Admin)]
    role: RoleArg,
    #[command(subcommand)]
    cmd: PanelCommand,
}

#[derive(Subcommand, Debug)]
enum PanelCommand {
    /// Create a library panel.
    Create {
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        folder: i64,
        #[arg(long)]
        uid: Option<String>,
        /// Panel model JSON file.
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// List panels of the organization.
    List,
    /// Print one panel as JSON.
    Get { uid: String },
    /// Change folder, name and/or model.
    Patch {
        uid: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        folder: Option<i64>,
        #[arg(long)]
        model: Option<PathBuf>,
    },
    /// Record that a dashboard uses the panel.
    Connect { uid: String, dashboard: i64 },
    /// Remove a dashboard connection.
    Disconnect { uid: String, dashboard: i64 },
    /// Delete a panel that no dashboard uses.
    Delete { uid: String },
    /// Print (or with --set, replace) the panel's legend options.
    Legend {
        uid: String,
        #[arg(long)]
        set: Option<PathBuf>,
    },
    /// Write the panel listing as CSV.
    Export { out: PathBuf },
}

fn default_store() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vizlegend")
        .join("library_panels.json")
}

fn read_model(path: &Path) -> Result<Map<String, Value>> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    match serde_json::from_str::<Value>(&s)? {
        Value::Object(m) => Ok(m),
        _ => bail!("{} must contain a JSON object", path.display()),
    }
}

fn read_legend(path: &Path) -> Result<VizLegendOptions> {
    let s = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    VizLegendOptions::from_json_str(&s).with_context(|| format!("parsing {}", path.display()))
}

fn summarize(opts: &VizLegendOptions) -> String {
    if !opts.is_visible() {
        return "legend hidden".to_string();
    }
    let names: Vec<String> = opts.calcs.iter().map(|c| calcs::display_name(c)).collect();
    format!(
        "{} legend at {} with {} calc(s): {}",
        opts.display_mode,
        opts.placement,
        opts.calcs.len(),
        names.join(", ")
    )
}

fn print_panel(p: &LibraryPanel) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(p)?);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Legend(cmd) => cmd_legend(cmd),
        Command::Panels(args) => cmd_panels(args),
    }
}

fn cmd_legend(cmd: LegendCommand) -> Result<()> {
    match cmd {
        LegendCommand::Check { file, strict } => {
            let opts = read_legend(&file)?;
            if strict {
                opts.validate()
                    .with_context(|| format!("validating {}", file.display()))?;
            }
            println!("{}", summarize(&opts));
        }
        LegendCommand::Default => {
            println!("{}", serde_json::to_string_pretty(&VizLegendOptions::default())?);
        }
    }
    Ok(())
}

fn cmd_panels(args: PanelsArgs) -> Result<()> {
    let store = args.store.clone().unwrap_or_else(default_store);
    let user = SignedInUser::new(args.user_id, args.org, args.login.clone(), args.role.into());
    let mut svc = storage::load_json(&store)?;

    let dirty = match args.cmd {
        PanelCommand::Create {
            name,
            folder,
            uid,
            model,
        } => {
            let model = match model {
                Some(path) => read_model(&path)?,
                None => Map::new(),
            };
            let p = svc.create(
                &user,
                CreateLibraryPanelCommand {
                    uid,
                    folder_id: folder,
                    name,
                    model,
                },
            )?;
            print_panel(&p)?;
            true
        }
        PanelCommand::List => {
            for p in svc.list(&user) {
                println!(
                    "{}  {}  folder={}  dashboards={}",
                    p.uid, p.name, p.folder_id, p.meta.connected_dashboards
                );
            }
            false
        }
        PanelCommand::Get { uid } => {
            print_panel(&svc.get(&user, &uid)?)?;
            false
        }
        PanelCommand::Patch {
            uid,
            name,
            folder,
            model,
        } => {
            let model = model.as_deref().map(read_model).transpose()?;
            let p = svc.patch(
                &user,
                &uid,
                PatchLibraryPanelCommand {
                    folder_id: folder,
                    name,
                    model,
                },
            )?;
            print_panel(&p)?;
            true
        }
        PanelCommand::Connect { uid, dashboard } => {
            let p = svc.connect(&user, &uid, dashboard)?;
            eprintln!("{} is used by {} dashboard(s)", p.uid, p.meta.connected_dashboards);
            true
        }
        PanelCommand::Disconnect { uid, dashboard } => {
            let p = svc.disconnect(&user, &uid, dashboard)?;
            eprintln!("{} is used by {} dashboard(s)", p.uid, p.meta.connected_dashboards);
            true
        }
        PanelCommand::Delete { uid } => {
            let p = svc.delete(&user, &uid)?;
            eprintln!("Deleted {} ({})", p.uid, p.name);
            true
        }
        PanelCommand::Legend { uid, set } => match set {
            Some(path) => {
                let legend = read_legend(&path)?;
                svc.set_legend_options(&user, &uid, &legend)?;
                println!("{}", summarize(&legend));
                true
            }
            None => {
                match svc.legend_options(&user, &uid)? {
                    Some(legend) => println!("{}", summarize(&legend)),
                    None => println!("no legend options"),
                }
                false
            }
        },
        PanelCommand::Export { out } => {
            let panels = svc.list(&user);
            storage::save_csv(&panels, &out)?;
            eprintln!("Saved {} rows to {}", panels.len(), out.display());
            false
        }
    };

    if dirty {
        storage::save_json(&svc, &store)?;
    }
    Ok(())
}
