mod render;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wardview_core::{
    config::seed_flag_from_env_value, constants::DEFAULT_DATA_DIR, CoreConfig, Dashboard,
    FileStore, FilesService, RecordActions, RecordStore, Role, RoleProfileRegistry, SeedData,
    SessionUser,
};

use render::TextRenderer;

#[derive(Parser)]
#[command(name = "wardview")]
#[command(about = "Wardview clinical records dashboard CLI")]
struct Cli {
    /// Directory holding the record collections
    #[arg(long, env = "WARDVIEW_DATA_DIR", default_value = DEFAULT_DATA_DIR, global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List the known roles and what each may view
    Roles,
    /// Show the navigation menu of a role
    Menu {
        /// Role name, e.g. "Lab Tech"
        #[arg(long)]
        role: String,
    },
    /// Sign in and render a page (the role's landing page by default)
    Show {
        /// Role name, e.g. "Physician"
        #[arg(long)]
        role: String,
        /// Display name of the signed-in user
        #[arg(long, default_value = "cli")]
        name: String,
        /// Patient id, for the Patient role
        #[arg(long)]
        patient_id: Option<String>,
        /// Page id to open after landing
        #[arg(long)]
        page: Option<String>,
    },
    /// Seed never-initialised collections with demo data
    Seed,
    /// Attach a file to a patient, lab result or imaging result
    Attach {
        /// Collection key: patients, labResults or imagingResults
        collection: String,
        /// Record id
        id: String,
        /// File to attach
        file: PathBuf,
        #[arg(long)]
        role: String,
        #[arg(long, default_value = "cli")]
        name: String,
    },
    /// Delete a record
    Delete {
        /// Collection key, e.g. medications
        collection: String,
        /// Record id
        id: String,
        #[arg(long)]
        role: String,
        #[arg(long, default_value = "cli")]
        name: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wardview_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let seed = seed_flag_from_env_value(std::env::var("WARDVIEW_SEED_DEMO").ok())?;
    let cfg = CoreConfig::new(cli.data_dir, None, seed)?;

    match cli.command {
        Some(Commands::Roles) => {
            let registry = RoleProfileRegistry::global();
            for role in Role::ALL {
                let viewable: Vec<&str> = registry
                    .get_profile(role)
                    .viewable()
                    .iter()
                    .map(|c| c.as_str())
                    .collect();
                println!("{:<12} {}", role, viewable.join(", "));
            }
        }
        Some(Commands::Menu { role }) => {
            let user = SessionUser::new("cli", role, None);
            let menu = user.profile().menu();
            if menu.is_empty() {
                println!("No menu for role '{}'.", user.role_label());
            }
            for entry in menu {
                println!("{:<22} {}", entry.id, entry.label);
            }
        }
        Some(Commands::Show {
            role,
            name,
            patient_id,
            page,
        }) => {
            let store = open_store(&cfg)?;
            let mut renderer = TextRenderer::default();
            let mut dashboard =
                Dashboard::initialize(&store, SessionUser::new(name, role, patient_id), &mut renderer)?;
            if let Some(page) = page {
                // Only the last page drawn is printed.
                renderer = TextRenderer::default();
                dashboard.select_page(&page, &mut renderer)?;
            }
            print!("{}", renderer.into_string());
        }
        Some(Commands::Seed) => {
            cfg.ensure_dirs()?;
            let mut store = RecordStore::new(FileStore::new(cfg.data_dir()));
            let seeded = store.seed_all(&SeedData::demo())?;
            if seeded.is_empty() {
                println!("All collections already initialised.");
            } else {
                println!("Seeded: {}", seeded.join(", "));
            }
        }
        Some(Commands::Attach {
            collection,
            id,
            file,
            role,
            name,
        }) => {
            let mut store = open_store(&cfg)?;
            let files = FilesService::new(cfg.files_dir())?;
            let bytes = std::fs::read(&file)?;
            let filename = file
                .file_name()
                .map(|f| f.to_string_lossy().into_owned())
                .unwrap_or_else(|| "attachment".into());

            let user = SessionUser::new(name, role, None);
            let handle = RecordActions::new(&mut store, &user)
                .attach_in(&files, &collection, &id, &filename, &bytes)?;
            println!(
                "Attached {} to {} {} ({} bytes, {})",
                handle.original_filename, collection, id, handle.size_bytes, handle.hash
            );
        }
        Some(Commands::Delete {
            collection,
            id,
            role,
            name,
        }) => {
            let mut store = open_store(&cfg)?;
            let user = SessionUser::new(name, role, None);
            RecordActions::new(&mut store, &user).delete_in(&collection, &id)?;
            println!("Deleted {} {}", collection, id);
        }
        None => {
            println!("Use 'wardview --help' for commands");
        }
    }

    Ok(())
}

/// Open the file-backed store, seeding fresh collections when enabled.
fn open_store(cfg: &CoreConfig) -> Result<RecordStore<FileStore>, Box<dyn std::error::Error>> {
    cfg.ensure_dirs()?;
    let mut store = RecordStore::new(FileStore::new(cfg.data_dir()));
    if cfg.seed_demo_data() {
        store.seed_all(&SeedData::demo())?;
    }
    Ok(store)
}
