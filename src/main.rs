use clap::Parser;
use diario::application::{
    connect_journal, init::init, open_journal, ConfigService, SessionService,
};
use diario::cli::{format_entry, format_entry_list, format_status, Cli, Commands};
use diario::error::{DiarioError, Result};
use diario::infrastructure::{FileSystemRepository, JournalRepository};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("DIARIO_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(_) => std::process::exit(0),
        Err(e) => {
            eprintln!("Error: {}", e.display_with_suggestions());
            std::process::exit(e.exit_code());
        }
    }
}

fn sessions(repo: &FileSystemRepository) -> Result<SessionService> {
    let config = repo.load_config()?;
    Ok(SessionService::new(repo.storage(), config.passphrase))
}

fn require_text(value: &str, field: &'static str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(DiarioError::EmptyField(field));
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let Some(command) = cli.command else {
        println!("diario - Shared household journal");
        println!("Use --help for usage information");
        return Ok(());
    };

    match command {
        Commands::Init { path, url, key } => {
            let config = init(&path, url, key)?;
            println!("Initialized diario journal at {}", path.display());
            if !config.remote.is_configured() {
                println!("No remote store configured; entries stay on this device.");
                println!("Set one with: diario config remote.url <URL>");
            }
            Ok(())
        }
        Commands::Login { user, passphrase } => {
            let repo = FileSystemRepository::discover()?;
            let session = sessions(&repo)?.login(&user, &passphrase)?;
            println!("Welcome, {}", session.author);
            Ok(())
        }
        Commands::Logout => {
            let repo = FileSystemRepository::discover()?;
            sessions(&repo)?.logout()?;
            println!("Logged out");
            Ok(())
        }
        Commands::Whoami => {
            let repo = FileSystemRepository::discover()?;
            let session = sessions(&repo)?.require()?;
            println!("{}", session.author);
            Ok(())
        }
        Commands::List => {
            let repo = FileSystemRepository::discover()?;
            sessions(&repo)?.require()?;

            let mut journal = open_journal(&repo)?;
            let entries = journal.list_entries();
            println!("{}", format_status(journal.status()));
            println!();
            print!("{}", format_entry_list(&entries));
            if entries.is_empty() {
                println!();
            }
            Ok(())
        }
        Commands::Add { title, content } => {
            require_text(&title, "Title")?;
            require_text(&content, "Content")?;

            let repo = FileSystemRepository::discover()?;
            let session = sessions(&repo)?.require()?;

            let mut journal = open_journal(&repo)?;
            let result = journal.create_entry(&title, &content, session.author.as_str());
            println!("{}", format_status(journal.status()));
            let entry = result?;
            println!("Saved {}", format_entry(&entry));
            Ok(())
        }
        Commands::Edit { id, title, content } => {
            if title.is_none() && content.is_none() {
                return Err(DiarioError::Config(
                    "Nothing to change: pass --title and/or --content".to_string(),
                ));
            }
            if let Some(t) = &title {
                require_text(t, "Title")?;
            }
            if let Some(c) = &content {
                require_text(c, "Content")?;
            }

            let repo = FileSystemRepository::discover()?;
            sessions(&repo)?.require()?;

            let mut journal = open_journal(&repo)?;
            journal.take_failure();
            let found = journal.list_entries().into_iter().find(|e| e.id == id);
            let Some(current) = found else {
                println!("{}", format_status(journal.status()));
                // An empty lookup after a remote failure is not a missing entry
                return Err(journal
                    .take_failure()
                    .unwrap_or(DiarioError::NotFound(id)));
            };

            let title = title.unwrap_or(current.title);
            let content = content.unwrap_or(current.content);
            let result = journal.update_entry(&id, &title, &content);
            println!("{}", format_status(journal.status()));
            let entry = result?;
            println!("Updated {}", format_entry(&entry));
            Ok(())
        }
        Commands::Delete { id } => {
            let repo = FileSystemRepository::discover()?;
            sessions(&repo)?.require()?;

            let mut journal = open_journal(&repo)?;
            journal.take_failure();
            let removed = journal.delete_entry(&id);
            println!("{}", format_status(journal.status()));
            if !removed {
                return Err(journal
                    .take_failure()
                    .unwrap_or(DiarioError::NotFound(id)));
            }
            println!("Deleted {}", id);
            Ok(())
        }
        Commands::Status => {
            let repo = FileSystemRepository::discover()?;
            let journal = connect_journal(&repo)?;
            println!("{}", format_status(journal.status()));
            Ok(())
        }
        Commands::Migrate => {
            let repo = FileSystemRepository::discover()?;
            let mut journal = connect_journal(&repo)?;
            let outcome = journal.migrate_local_to_remote();
            println!("{}", format_status(journal.status()));
            println!("{}", outcome);
            Ok(())
        }
        Commands::Config { key, value, list } => {
            let repo = FileSystemRepository::discover()?;
            let service = ConfigService::new(repo);

            if list {
                for (k, v) in service.list()? {
                    println!("{} = {}", k, v);
                }
            } else if let Some(k) = key {
                if let Some(v) = value {
                    service.set(&k, &v)?;
                    println!("Set {} = {}", k, v);
                } else {
                    println!("{}", service.get(&k)?);
                }
            } else {
                println!("Usage: diario config [--list | <key> [<value>]]");
                println!("Valid keys: remote.url, remote.key, remote.table, remote.timeout, passphrase");
            }
            Ok(())
        }
    }
}
