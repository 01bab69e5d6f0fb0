use std::fmt;
use std::io::Read;
use std::path::Path;

use memento_crypto::{metadata_hash, ContentHasher, HashedFile};
use memento_registry::{ProofRegistryClient, TxReference, TxStatus};
use memento_types::{parse_date, ContentType, CreationMetadata, Proof};
use memento_wallet::{AuthorshipSignature, SignatureRequestor, WalletSession};
use tracing::{debug, info, warn};

use crate::certificate::Certificate;
use crate::config::WorkflowConfig;
use crate::error::{WorkflowError, WorkflowResult};
use crate::state::{today, DetailsInput, WorkflowState, WorkflowStep};

/// Identifier of one workflow run (UUID v7, time-ordered), used to correlate logs.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkflowRunId(uuid::Uuid);

impl WorkflowRunId {
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for WorkflowRunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for WorkflowRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkflowRunId({})", self.short_id())
    }
}

impl fmt::Display for WorkflowRunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Drives one proof through type selection, details, hashing, signing,
/// submission, and confirmation.
///
/// Each operation checks that the data it needs is present rather than
/// which step is current, so [`back`](Self::back) can revisit any earlier
/// step without discarding work.
pub struct WorkflowController {
    run_id: WorkflowRunId,
    config: WorkflowConfig,
    hasher: ContentHasher,
    session: WalletSession,
    registry: ProofRegistryClient,
    requestor: SignatureRequestor,
    state: WorkflowState,
    step: WorkflowStep,
    proof: Option<Proof>,
}

impl WorkflowController {
    pub fn new(
        config: WorkflowConfig,
        session: WalletSession,
        registry: ProofRegistryClient,
    ) -> Self {
        Self::resume(config, session, registry, WorkflowState::default())
    }

    /// Rebuild a controller from carried state, at the furthest step that
    /// state supports.
    pub fn resume(
        config: WorkflowConfig,
        session: WalletSession,
        registry: ProofRegistryClient,
        state: WorkflowState,
    ) -> Self {
        let step = state.derived_step();
        let run_id = WorkflowRunId::new();
        debug!(run = %run_id, step = ?step, "workflow started");
        Self {
            run_id,
            hasher: config.hasher(),
            config,
            session,
            registry,
            requestor: SignatureRequestor::new(),
            state,
            step,
            proof: None,
        }
    }

    // ---- Accessors ----

    pub fn run_id(&self) -> WorkflowRunId {
        self.run_id
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// The confirmed proof, once [`reconcile`](Self::reconcile) has seen it.
    pub fn proof(&self) -> Option<&Proof> {
        self.proof.as_ref()
    }

    /// Query string carrying the navigable state.
    pub fn query(&self) -> String {
        self.state.to_query()
    }

    // ---- Steps ----

    pub fn select_type(&mut self, content_type: ContentType) {
        self.state.content_type = content_type;
        debug!(run = %self.run_id, content_type = %content_type, "type selected");
    }

    /// Validate and store the creation details.
    pub fn enter_details(&mut self, input: DetailsInput) -> WorkflowResult<()> {
        self.ensure_not_submitted()?;
        let date = match input.date.as_deref().map(str::trim) {
            Some(d) if !d.is_empty() => parse_date(d)?,
            _ => today(),
        };
        let mut meta =
            CreationMetadata::new(input.title, date).map_err(|_| WorkflowError::MissingTitle)?;
        if let Some(description) = input.description {
            meta = meta.with_description(description);
        }
        if let Some(tags) = input.tags {
            meta = meta.with_tags(tags);
        }

        self.state.title = Some(meta.title().to_string());
        self.state.description = meta.description().map(str::to_string);
        self.state.tags = meta.tags().map(str::to_string);
        self.state.date = Some(meta.date());
        self.transition(WorkflowStep::DetailsEntered);
        Ok(())
    }

    /// Hash a file on disk.
    pub fn hash_file(&mut self, path: &Path) -> WorkflowResult<&HashedFile> {
        self.ensure_ready_to_hash()?;
        let hashed = self.hasher.hash_file(path, self.config.max_file_size)?;
        Ok(self.store_file(hashed))
    }

    /// Hash an in-memory payload under `filename`.
    pub fn hash_bytes(&mut self, filename: &str, data: &[u8]) -> WorkflowResult<&HashedFile> {
        self.hash_reader(filename, data)
    }

    /// Hash a stream under `filename`.
    pub fn hash_reader<R: Read>(&mut self, filename: &str, reader: R) -> WorkflowResult<&HashedFile> {
        self.ensure_ready_to_hash()?;
        let content = self.hasher.hash_reader(reader, self.config.max_file_size)?;
        Ok(self.store_file(HashedFile {
            hash: content.hash,
            filename: filename.to_string(),
            size: content.size,
        }))
    }

    /// Ask the wallet to sign the authorship statement for the current file.
    ///
    /// A signature already held for the same file hash is reused.
    pub async fn sign_authorship(&mut self) -> WorkflowResult<&AuthorshipSignature> {
        self.ensure_not_submitted()?;
        let file_hash = *self.state.file_hash().ok_or(WorkflowError::FileRequired)?;

        if self.state.current_signature().is_some() {
            debug!(run = %self.run_id, file_hash = %file_hash, "reusing authorship signature");
        } else {
            let signed = self.requestor.request(&self.session, &file_hash).await?;
            self.state.signature = Some(signed);
        }
        self.transition(WorkflowStep::AuthorshipSigned);
        self.state
            .current_signature()
            .ok_or(WorkflowError::SignatureRequired)
    }

    /// Register the proof.
    ///
    /// Returns as soon as the registry accepts the transaction; use
    /// [`reconcile`](Self::reconcile) to observe confirmation. Calling again
    /// after a successful submission returns the same reference.
    pub async fn submit(&mut self) -> WorkflowResult<TxReference> {
        if let Some(tx) = &self.state.transaction {
            debug!(run = %self.run_id, tx = %tx.hash, "proof already submitted");
            return Ok(tx.clone());
        }
        if !self.state.has_details() {
            return Err(WorkflowError::DetailsRequired);
        }
        let file_hash = *self.state.file_hash().ok_or(WorkflowError::FileRequired)?;
        let signer = self
            .state
            .current_signature()
            .ok_or(WorkflowError::SignatureRequired)?
            .signer;

        let sender = self.session.account().await?;
        if sender != signer {
            return Err(WorkflowError::SignerMismatch {
                signer,
                connected: sender,
            });
        }
        let _guard = self.session.begin_request()?;

        let on_network = self
            .session
            .wallet()
            .switch_network(&self.config.network)
            .await?;
        if !on_network {
            let expected = self.config.network.chain_id;
            let actual = self.session.wallet().chain_id().await?;
            warn!(run = %self.run_id, expected, actual, "wallet did not switch network");
            return Err(WorkflowError::WrongNetwork { expected, actual });
        }

        let metadata = self.state.metadata()?;
        let metadata_hash = metadata_hash(&metadata, &self.hasher)?;
        let tx = self
            .registry
            .submit_proof(sender, file_hash.as_bytes(), Some(metadata_hash.as_bytes()))
            .await?;

        info!(
            run = %self.run_id,
            tx = %tx.hash,
            file_hash = %file_hash,
            metadata_hash = %metadata_hash,
            "proof submitted"
        );
        self.state.transaction = Some(tx.clone());
        self.transition(WorkflowStep::ProofSubmitted);
        Ok(tx)
    }

    /// Check the registry for the submitted proof.
    ///
    /// Moves to `Confirmed` once the proof is readable and bound to this
    /// workflow's sender and metadata hash. A reverted transaction is
    /// forgotten and the workflow returns to the signed step so it can be
    /// submitted again.
    pub async fn reconcile(&mut self) -> WorkflowResult<WorkflowStep> {
        if self.step == WorkflowStep::Confirmed {
            return Ok(self.step);
        }
        let tx = self
            .state
            .transaction
            .clone()
            .ok_or(WorkflowError::NotSubmitted)?;

        if let Some(proof) = self.registry.get_proof(&tx.file_hash).await {
            if !proof.is_bound_to(&tx.sender, &tx.metadata_hash) {
                return Err(WorkflowError::ProofMismatch(tx.file_hash));
            }
            info!(run = %self.run_id, file_hash = %proof.file_hash, "proof confirmed");
            self.proof = Some(proof);
            self.transition(WorkflowStep::Confirmed);
            return Ok(self.step);
        }

        match self.registry.transaction_status(&tx.hash).await {
            TxStatus::Reverted { reason } => {
                warn!(run = %self.run_id, tx = %tx.hash, reason = %reason, "submission reverted");
                self.state.transaction = None;
                self.step = self.state.derived_step();
                Err(WorkflowError::Reverted { tx: tx.hash, reason })
            }
            status => {
                debug!(run = %self.run_id, tx = %tx.hash, status = %status, "proof not yet visible");
                Ok(self.step)
            }
        }
    }

    /// Certificate for the confirmed proof.
    pub fn certificate(&self) -> Option<Certificate> {
        let proof = self.proof.as_ref()?;
        let links = self.config.explorer();
        let mut cert = Certificate::new(proof, &links);
        if let Some(tx) = &self.state.transaction {
            cert = cert.with_transaction(tx.hash, &links);
        }
        if let Some(contract) = &self.config.contract_address {
            cert = cert.with_contract(contract, &links);
        }
        if let Ok(meta) = self.state.metadata() {
            cert = cert.with_metadata(meta);
        }
        Some(cert)
    }

    /// Return to the previous step. Nothing entered so far is discarded.
    pub fn back(&mut self) -> WorkflowStep {
        self.step = self.step.previous();
        debug!(run = %self.run_id, step = ?self.step, "went back");
        self.step
    }

    /// Forget everything and start again at type selection.
    pub fn reset(&mut self) {
        self.state = WorkflowState::new(self.state.content_type);
        self.proof = None;
        self.step = WorkflowStep::TypeSelected;
        self.run_id = WorkflowRunId::new();
    }

    // ---- Internals ----

    fn transition(&mut self, to: WorkflowStep) {
        if self.step != to {
            info!(run = %self.run_id, from = ?self.step, to = ?to, "workflow step");
        }
        self.step = to;
    }

    fn ensure_not_submitted(&self) -> WorkflowResult<()> {
        if self.state.transaction.is_some() {
            return Err(WorkflowError::AlreadySubmitted);
        }
        Ok(())
    }

    fn ensure_ready_to_hash(&self) -> WorkflowResult<()> {
        self.ensure_not_submitted()?;
        if !self.state.has_details() {
            return Err(WorkflowError::DetailsRequired);
        }
        Ok(())
    }

    fn store_file(&mut self, hashed: HashedFile) -> &HashedFile {
        let changed = self.state.file_hash() != Some(&hashed.hash);
        if changed && self.state.signature.take().is_some() {
            debug!(run = %self.run_id, "file changed; authorship signature dropped");
        }
        debug!(run = %self.run_id, file_hash = %hashed.hash, size = hashed.size, "file hashed");
        self.transition(WorkflowStep::FileHashed);
        self.state.file.insert(hashed)
    }
}

impl fmt::Debug for WorkflowController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowController")
            .field("run_id", &self.run_id)
            .field("step", &self.step)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
