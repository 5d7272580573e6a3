/**
 * LINE STORE - Persistance fichier ligne-à-ligne du kernel
 *
 * RÔLE : Le pool d'IPs et le ledger de réservations suivent la même discipline
 * "fichier comme base de données" : lire tout l'état, muter en mémoire, réécrire.
 * Ce module isole cette discipline derrière un petit port de stockage pour
 * pouvoir la remplacer (KV transactionnel) si le kernel devient multi-writer.
 */

use crate::errors::KernelError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Interface commune des stores fichier du kernel (pool + ledger)
pub trait LineStore: Send + Sync {
    /// Lignes non vides du fichier, trimées. Fichier absent = store vide.
    fn read_lines(&self) -> Result<Vec<String>, KernelError>;

    /// Réécrit le fichier en entier (snapshot complet, jamais incrémental).
    fn write_lines(&self, lines: &[String]) -> Result<(), KernelError>;

    /// Ajoute une ligne en fin de fichier, en le créant si nécessaire.
    fn append_line(&self, line: &str) -> Result<(), KernelError>;
}

pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LineStore for FileStore {
    fn read_lines(&self) -> Result<Vec<String>, KernelError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn write_lines(&self, lines: &[String]) -> Result<(), KernelError> {
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        fs::write(&self.path, content)?;
        Ok(())
    }

    fn append_line(&self, line: &str) -> Result<(), KernelError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }
}
