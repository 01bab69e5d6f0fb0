use memento_crypto::{metadata_hash, ContentHasher};
use memento_registry::TxHash;
use memento_types::{AccountAddress, ContentHash, CreationMetadata, Proof, ProofTimestamp};
use serde::Serialize;

use crate::links::ExplorerLinks;
use crate::state::certificate_path;

/// Displayable record of a confirmed proof.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub file_hash: ContentHash,
    pub metadata_hash: ContentHash,
    pub creator: AccountAddress,
    pub timestamp: ProofTimestamp,
    pub registered_at: String,
    pub path: String,
    pub creator_url: String,
    pub transaction: Option<TxHash>,
    pub transaction_url: Option<String>,
    pub contract_url: Option<String>,
    pub metadata: Option<CreationMetadata>,
}

impl Certificate {
    pub fn new(proof: &Proof, links: &ExplorerLinks) -> Self {
        Self {
            file_hash: proof.file_hash,
            metadata_hash: proof.metadata_hash,
            creator: proof.creator,
            timestamp: proof.timestamp,
            registered_at: proof.timestamp.to_rfc3339(),
            path: certificate_path(&proof.file_hash),
            creator_url: links.address_url(&proof.creator),
            transaction: None,
            transaction_url: None,
            contract_url: None,
            metadata: None,
        }
    }

    pub fn with_transaction(mut self, tx: TxHash, links: &ExplorerLinks) -> Self {
        self.transaction_url = Some(links.transaction_url(&tx));
        self.transaction = Some(tx);
        self
    }

    pub fn with_contract(mut self, contract: &AccountAddress, links: &ExplorerLinks) -> Self {
        self.contract_url = Some(links.contract_url(contract));
        self
    }

    pub fn with_metadata(mut self, metadata: CreationMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether `metadata` is the record this proof was registered with.
    pub fn verify_metadata(&self, metadata: &CreationMetadata, hasher: &ContentHasher) -> bool {
        metadata_hash(metadata, hasher).is_ok_and(|h| h == self.metadata_hash)
    }

    /// Plain-text rendering, one field per line.
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("File hash:     {}", self.file_hash.to_hex()),
            format!("Creator:       {}", self.creator),
            format!("Registered at: {}", self.registered_at),
            format!("Metadata hash: {}", self.metadata_hash.to_hex()),
        ];
        if let Some(meta) = &self.metadata {
            lines.push(format!("Title:         {}", meta.title()));
            if let Some(description) = meta.description() {
                lines.push(format!("Description:   {description}"));
            }
            if let Some(tags) = meta.tags() {
                lines.push(format!("Tags:          {tags}"));
            }
            lines.push(format!("Date:          {}", meta.date()));
            if let (Some(name), Some(size)) = (meta.filename(), meta.filesize()) {
                lines.push(format!("File:          {name} ({})", format_file_size(size)));
            }
        }
        lines.push(format!("Certificate:   {}", self.path));
        lines.push(format!("Creator link:  {}", self.creator_url));
        if let Some(url) = &self.transaction_url {
            lines.push(format!("Transaction:   {url}"));
        }
        if let Some(url) = &self.contract_url {
            lines.push(format!("Registry:      {url}"));
        }
        lines.join("\n")
    }
}

/// Human-readable file size with up to two decimals, e.g. `1.5 KB`.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = format!("{value:.2}");
    let trimmed = rounded.trim_end_matches('0').trim_end_matches('.');
    format!("{trimmed} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn meta() -> CreationMetadata {
        CreationMetadata::new("Doc", NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .unwrap()
            .with_file("doc.pdf", 1536)
    }

    fn proof() -> Proof {
        Proof {
            file_hash: ContentHash::from_digest([0xab; 32]),
            metadata_hash: metadata_hash(&meta(), &ContentHasher::SHA256).unwrap(),
            creator: AccountAddress::from_bytes([0x11; 20]),
            timestamp: ProofTimestamp::from_secs(1_700_000_000),
        }
    }

    #[test]
    fn file_sizes() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(1000), "1000 Bytes");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_file_size(1_234_567), "1.18 MB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3072 GB");
    }

    #[test]
    fn certificate_fields() {
        let links = ExplorerLinks::new("https://sepolia.etherscan.io");
        let cert = Certificate::new(&proof(), &links)
            .with_transaction(TxHash::from_bytes([1; 32]), &links);
        assert_eq!(cert.registered_at, "2023-11-14T22:13:20Z");
        assert_eq!(cert.path, format!("/proof/{}", "ab".repeat(32)));
        assert!(cert.creator_url.ends_with(&format!("/address/0x{}", "11".repeat(20))));
        assert!(cert.transaction_url.unwrap().contains("/tx/0x0101"));
    }

    #[test]
    fn verifies_matching_metadata_only() {
        let cert = Certificate::new(&proof(), &ExplorerLinks::new("https://x.test"));
        assert!(cert.verify_metadata(&meta(), &ContentHasher::SHA256));
        assert!(!cert.verify_metadata(&meta().with_tags("edited"), &ContentHasher::SHA256));
    }

    #[test]
    fn contract_link_rendered_when_set() {
        let links = ExplorerLinks::new("https://x.test");
        let plain = Certificate::new(&proof(), &links);
        assert!(plain.contract_url.is_none());
        assert!(!plain.render().contains("Registry:"));

        let cert = plain.with_contract(&AccountAddress::from_bytes([0x44; 20]), &links);
        let url = format!("https://x.test/address/0x{}", "44".repeat(20));
        assert_eq!(cert.contract_url.as_deref(), Some(url.as_str()));
        assert!(cert.render().contains(&format!("Registry:      {url}")));
    }

    #[test]
    fn render_includes_metadata() {
        let cert = Certificate::new(&proof(), &ExplorerLinks::new("https://x.test")).with_metadata(meta());
        let text = cert.render();
        assert!(text.contains("Title:         Doc"));
        assert!(text.contains("doc.pdf (1.5 KB)"));
    }
}
