use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context};
use colored::Colorize;
use memento_crypto::SigningKey;
use memento_registry::{InMemoryRegistry, TxHash};
use memento_types::AccountAddress;
use memento_wallet::LocalWallet;
use memento_workflow::{
    format_file_size, Certificate, ContentHash, ContentType, DetailsInput, ProofRegistryClient,
    WalletSession, WorkflowController, WorkflowStep,
};
use serde::Serialize;
use tracing::debug;

use crate::cli::*;
use crate::config::CliConfig;

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::load(&cli.config)?;
    debug!(config = %cli.config.display(), state_dir = %config.state_dir.display(), "configuration loaded");
    let format = cli.format;
    match cli.command {
        Command::Hash(args) => cmd_hash(&config, format, args),
        Command::Keygen(args) => cmd_keygen(&config, args),
        Command::Create(args) => cmd_create(&config, format, args).await,
        Command::Exists(args) => cmd_exists(&config, format, args).await,
        Command::Show(args) => cmd_show(&config, format, args).await,
        Command::Count(args) => cmd_count(&config, format, args).await,
        Command::Mine(_) => cmd_mine(&config),
        Command::Status(args) => cmd_status(&config, format, args).await,
        Command::Address(_) => cmd_address(&config),
        Command::Config(_) => cmd_config(&config),
    }
}

fn cmd_hash(config: &CliConfig, format: OutputFormat, args: HashArgs) -> anyhow::Result<()> {
    let hasher = match args.algorithm {
        Some(algorithm) => memento_crypto::ContentHasher::new(algorithm),
        None => config.workflow.hasher(),
    };
    let hashed = hasher
        .hash_file(&args.path, config.workflow.max_file_size)
        .with_context(|| format!("cannot hash {}", args.path.display()))?;

    if format == OutputFormat::Json {
        return print_json(&hashed);
    }
    println!("{}  {}", hashed.hash.to_hex().cyan(), hashed.filename);
    println!("  Algorithm: {}", hasher.algorithm());
    println!("  Size: {}", format_file_size(hashed.size));
    Ok(())
}

fn cmd_keygen(config: &CliConfig, args: KeygenArgs) -> anyhow::Result<()> {
    let path = config.key_path();
    if path.exists() && !args.force {
        bail!("a wallet key already exists at {} (use --force to replace it)", path.display());
    }
    fs::create_dir_all(&config.state_dir)
        .with_context(|| format!("cannot create {}", config.state_dir.display()))?;
    let key = SigningKey::generate();
    fs::write(&path, key.to_hex())
        .with_context(|| format!("cannot write {}", path.display()))?;

    println!("{} Wallet key written to {}", "✓".green().bold(), path.display());
    println!("  Address: {}", key.address().to_string().yellow());
    Ok(())
}

async fn cmd_create(config: &CliConfig, format: OutputFormat, args: CreateArgs) -> anyhow::Result<()> {
    let wallet = Arc::new(load_wallet(config)?);
    let registry = open_registry(config)?;
    let mut flow = WorkflowController::new(
        config.workflow.clone(),
        WalletSession::new(wallet),
        ProofRegistryClient::new(registry.clone()),
    );

    flow.select_type(ContentType::from_param(Some(&args.content_type)));
    let mut details = DetailsInput::new(args.title);
    if let Some(description) = args.description {
        details = details.with_description(description);
    }
    if let Some(tags) = args.tags {
        details = details.with_tags(tags);
    }
    if let Some(date) = args.date {
        details = details.with_date(date);
    }
    flow.enter_details(details)?;

    let hashed = flow
        .hash_file(&args.path)
        .with_context(|| format!("cannot hash {}", args.path.display()))?
        .clone();
    let signer = flow.sign_authorship().await?.signer;
    let tx = flow.submit().await?;
    save_registry(config, &registry)?;

    let step = flow.reconcile().await?;
    if format == OutputFormat::Json {
        return print_json(&CreateOutput {
            step: step.label(),
            transaction: &tx,
            certificate: flow.certificate(),
        });
    }

    println!(
        "{} Hashed {} ({})",
        "✓".green().bold(),
        hashed.filename.bold(),
        format_file_size(hashed.size)
    );
    println!("  File hash: {}", hashed.hash.to_hex().cyan());
    println!("{} Authorship signed by {}", "✓".green().bold(), signer.to_string().yellow());
    println!("{} Proof submitted in {}", "✓".green().bold(), tx.hash.to_string().yellow());

    match flow.certificate() {
        Some(cert) if step == WorkflowStep::Confirmed => {
            println!("{} Proof confirmed\n", "✓".green().bold());
            println!("{}", cert.render());
        }
        _ => {
            println!("  {} waiting for confirmation", "pending:".yellow());
            println!("  Run `memento mine`, then `memento status {}`", tx.hash);
        }
    }
    Ok(())
}

async fn cmd_exists(config: &CliConfig, format: OutputFormat, args: LookupArgs) -> anyhow::Result<()> {
    let file_hash = parse_file_hash(&args.hash)?;
    let client = ProofRegistryClient::new(open_registry(config)?);
    let exists = client.proof_exists(&file_hash).await;

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "file_hash": file_hash, "exists": exists }));
    }
    if exists {
        println!("{} Proof registered for {}", "✓".green().bold(), file_hash.to_hex().cyan());
    } else {
        println!("{} No proof for {}", "✗".red().bold(), file_hash.to_hex().cyan());
    }
    Ok(())
}

async fn cmd_show(config: &CliConfig, format: OutputFormat, args: LookupArgs) -> anyhow::Result<()> {
    let file_hash = parse_file_hash(&args.hash)?;
    let client = ProofRegistryClient::new(open_registry(config)?);
    let Some(proof) = client.get_proof(&file_hash).await else {
        bail!("no proof registered for {}", file_hash.to_hex());
    };
    let links = config.workflow.explorer();
    let mut cert = Certificate::new(&proof, &links);
    if let Some(contract) = &config.workflow.contract_address {
        cert = cert.with_contract(contract, &links);
    }

    if format == OutputFormat::Json {
        return print_json(&cert);
    }
    println!("{}", cert.render());
    Ok(())
}

async fn cmd_count(config: &CliConfig, format: OutputFormat, args: CountArgs) -> anyhow::Result<()> {
    let creator = match args.address {
        Some(address) => AccountAddress::from_hex(&address)
            .with_context(|| format!("invalid address {address:?}"))?,
        None => load_wallet(config)?.address(),
    };
    let client = ProofRegistryClient::new(open_registry(config)?);
    let count = client.creator_proof_count(&creator).await;

    if format == OutputFormat::Json {
        return print_json(&serde_json::json!({ "creator": creator, "proofs": count }));
    }
    println!("{} has {} proof(s)", creator.to_string().yellow(), count.to_string().bold());
    Ok(())
}

fn cmd_mine(config: &CliConfig) -> anyhow::Result<()> {
    let registry = open_registry(config)?;
    let pending = registry.pending_count()?;
    let block = registry.mine_block()?;
    save_registry(config, &registry)?;
    println!(
        "{} Mined block {} with {} transaction(s)",
        "✓".green().bold(),
        block.to_string().bold(),
        pending
    );
    Ok(())
}

async fn cmd_status(config: &CliConfig, format: OutputFormat, args: StatusArgs) -> anyhow::Result<()> {
    let tx: TxHash = args
        .tx
        .parse()
        .with_context(|| format!("invalid transaction hash {:?}", args.tx))?;
    let client = ProofRegistryClient::new(open_registry(config)?);
    let status = client.transaction_status(&tx).await;

    if format == OutputFormat::Json {
        return print_json(&status);
    }
    println!("Transaction {}: {}", tx.to_string().yellow(), status);
    println!("  {}", config.workflow.explorer().transaction_url(&tx).blue());
    Ok(())
}

fn cmd_address(config: &CliConfig) -> anyhow::Result<()> {
    let wallet = load_wallet(config)?;
    let address = wallet.address();
    println!("{}", address.to_string().yellow().bold());
    println!("  {}", config.workflow.explorer().address_url(&address).blue());
    Ok(())
}

fn cmd_config(config: &CliConfig) -> anyhow::Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

// ---- Helpers ----

#[derive(Serialize)]
struct CreateOutput<'a> {
    step: &'static str,
    transaction: &'a memento_workflow::TxReference,
    certificate: Option<Certificate>,
}

fn load_wallet(config: &CliConfig) -> anyhow::Result<LocalWallet> {
    let path = config.key_path();
    let text = fs::read_to_string(&path).with_context(|| {
        format!("no wallet key at {} (run `memento keygen` first)", path.display())
    })?;
    let key = SigningKey::from_hex(text.trim())
        .with_context(|| format!("malformed wallet key in {}", path.display()))?;
    Ok(LocalWallet::new(key))
}

fn open_registry(config: &CliConfig) -> anyhow::Result<Arc<InMemoryRegistry>> {
    let path = config.registry_path();
    let registry = InMemoryRegistry::load(&path, config.confirmation)
        .with_context(|| format!("cannot load registry state from {}", path.display()))?;
    Ok(Arc::new(registry))
}

fn save_registry(config: &CliConfig, registry: &InMemoryRegistry) -> anyhow::Result<()> {
    let path = config.registry_path();
    registry
        .save(&path)
        .with_context(|| format!("cannot save registry state to {}", path.display()))
}

fn parse_file_hash(value: &str) -> anyhow::Result<ContentHash> {
    ContentHash::from_hex(value).with_context(|| format!("invalid file hash {value:?}"))
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use memento_registry::ConfirmationMode;

    use super::*;

    fn config_in(dir: &std::path::Path, confirmation: ConfirmationMode) -> CliConfig {
        CliConfig {
            state_dir: dir.join("state"),
            confirmation,
            ..CliConfig::default()
        }
    }

    fn create_args(path: PathBuf) -> CreateArgs {
        CreateArgs {
            path,
            title: "Thesis".into(),
            description: None,
            tags: Some("ml, nlp".into()),
            date: Some("2024-05-01".into()),
            content_type: "document".into(),
        }
    }

    #[test]
    fn keygen_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), ConfirmationMode::Instant);
        cmd_keygen(&config, KeygenArgs { force: false }).unwrap();
        let first = load_wallet(&config).unwrap().address();

        assert!(cmd_keygen(&config, KeygenArgs { force: false }).is_err());
        assert_eq!(load_wallet(&config).unwrap().address(), first);

        cmd_keygen(&config, KeygenArgs { force: true }).unwrap();
        assert_ne!(load_wallet(&config).unwrap().address(), first);
    }

    #[test]
    fn missing_key_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), ConfirmationMode::Instant);
        let err = load_wallet(&config).unwrap_err();
        assert!(err.to_string().contains("memento keygen"));
    }

    #[test]
    fn short_hash_rejected() {
        assert!(parse_file_hash(&"ab".repeat(31)).is_err());
        assert!(parse_file_hash(&format!("0x{}", "ab".repeat(32))).is_ok());
    }

    #[tokio::test]
    async fn create_persists_registry_state() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), ConfirmationMode::Instant);
        cmd_keygen(&config, KeygenArgs { force: false }).unwrap();
        let file = dir.path().join("thesis.pdf");
        fs::write(&file, b"chapter one").unwrap();

        cmd_create(&config, OutputFormat::Text, create_args(file.clone()))
            .await
            .unwrap();

        let file_hash = config.workflow.hasher().hash(b"chapter one");
        let client = ProofRegistryClient::new(open_registry(&config).unwrap());
        assert!(client.proof_exists(&file_hash).await);
        let creator = load_wallet(&config).unwrap().address();
        assert_eq!(client.creator_proof_count(&creator).await, 1);

        let again = cmd_create(&config, OutputFormat::Text, create_args(file)).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn manual_confirmation_needs_mining() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), ConfirmationMode::Manual);
        cmd_keygen(&config, KeygenArgs { force: false }).unwrap();
        let file = dir.path().join("song.wav");
        fs::write(&file, b"la la la").unwrap();

        cmd_create(&config, OutputFormat::Json, create_args(file))
            .await
            .unwrap();
        let file_hash = config.workflow.hasher().hash(b"la la la");
        assert_eq!(open_registry(&config).unwrap().pending_count().unwrap(), 1);
        assert!(!ProofRegistryClient::new(open_registry(&config).unwrap())
            .proof_exists(&file_hash)
            .await);

        cmd_mine(&config).unwrap();
        let client = ProofRegistryClient::new(open_registry(&config).unwrap());
        assert!(client.proof_exists(&file_hash).await);
        assert!(client.get_proof(&file_hash).await.is_some());
    }

    #[tokio::test]
    async fn show_missing_proof_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path(), ConfirmationMode::Instant);
        let args = LookupArgs {
            hash: "cd".repeat(32),
        };
        assert!(cmd_show(&config, OutputFormat::Text, args).await.is_err());
    }
}
