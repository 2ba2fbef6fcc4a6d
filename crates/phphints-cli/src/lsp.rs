//! LSP server for phphints editor integration
//!
//! Lints PHP documents when they are opened or saved, publishes the hints as
//! diagnostics, shows hint messages on hover and offers a whole-file repair
//! as a quick fix.
//!
//! Usage:
//!   phphints lsp

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use phphints_core::overlay::{tag_range, tooltip_at};
use phphints_core::{logging, Hint};
use phphints_linters::{HintManager, LintReport};
use phphints_repair::RepairEngine;
use tokio::sync::Mutex;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService, Server};

use crate::process::{lint_file, repair_with_cycles};

const REPAIR_TITLE: &str = "Try to repair the file";

/// Latest known state of an open document
#[derive(Debug, Clone, Default)]
struct Document {
    text: String,
    /// Text the hints were computed from
    linted_text: String,
    hints: Vec<Hint>,
}

impl Document {
    fn linted(text: String, hints: Vec<Hint>) -> Self {
        Self {
            linted_text: text.clone(),
            text,
            hints,
        }
    }

    /// Hint positions only hold for the text they were linted from
    fn repairable(&self) -> bool {
        !self.hints.is_empty() && self.text == self.linted_text
    }
}

/// phphints LSP server backend
pub struct PhpHintsLsp {
    client: Client,
    manager: Arc<HintManager>,
    engine: Arc<RepairEngine>,
    cycles: usize,
    documents: Mutex<HashMap<Url, Document>>,
}

impl PhpHintsLsp {
    pub fn new(client: Client, manager: Arc<HintManager>, engine: Arc<RepairEngine>, cycles: usize) -> Self {
        Self {
            client,
            manager,
            engine,
            cycles,
            documents: Mutex::new(HashMap::new()),
        }
    }

    /// Lint `text` as the document at `uri`, remember it and publish diagnostics
    async fn check_document(&self, uri: Url, text: String) {
        let Some(path) = php_path(&uri) else {
            return;
        };

        let manager = Arc::clone(&self.manager);
        let content = text.clone();
        let linted = tokio::task::spawn_blocking(move || lint_file(&manager, &path, Some(&content))).await;

        let report = match linted {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => {
                logging::entry("lsp", &format!("lint failed for {}: {:#}", uri, e));
                self.client
                    .log_message(MessageType::ERROR, format!("phphints: {:#}", e))
                    .await;
                LintReport::default()
            }
            Err(e) => {
                logging::entry("lsp", &format!("lint task failed for {}: {}", uri, e));
                LintReport::default()
            }
        };

        for failure in &report.failures {
            self.client
                .log_message(
                    MessageType::WARNING,
                    format!("phphints: {} produced no hints: {}", failure.adapter, failure.error),
                )
                .await;
        }

        let diagnostics = to_diagnostics(&text, &report.hints);
        self.documents
            .lock()
            .await
            .insert(uri.clone(), Document::linted(text, report.hints));

        self.client.publish_diagnostics(uri, diagnostics, None).await;
    }
}

/// Local path of a PHP document
fn php_path(uri: &Url) -> Option<PathBuf> {
    if !uri.path().ends_with(".php") {
        return None;
    }
    uri.to_file_path().ok()
}

fn severity(source: &str) -> DiagnosticSeverity {
    match source {
        "phplint" => DiagnosticSeverity::ERROR,
        "phpmd" => DiagnosticSeverity::WARNING,
        _ => DiagnosticSeverity::INFORMATION,
    }
}

fn position((line, character): (usize, usize)) -> Position {
    Position {
        line: line as u32,
        character: character as u32,
    }
}

fn line_lengths(text: &str) -> Vec<usize> {
    text.split('\n')
        .map(|line| line.trim_end_matches('\r').encode_utf16().count())
        .collect()
}

/// Hints as diagnostics, clamped to the document
fn to_diagnostics(text: &str, hints: &[Hint]) -> Vec<Diagnostic> {
    let lengths = line_lengths(text);

    hints
        .iter()
        .map(|hint| {
            let range = tag_range(&lengths, hint);
            Diagnostic {
                range: Range {
                    start: position(range.start),
                    end: position(range.end),
                },
                severity: Some(severity(&hint.source)),
                source: Some(format!("phphints/{}", hint.source)),
                message: hint.message.clone(),
                ..Default::default()
            }
        })
        .collect()
}

/// Position just past the last character of `text`
fn document_end(text: &str) -> Position {
    let lengths = line_lengths(text);
    let last = lengths.len() - 1;
    position((last, lengths[last]))
}

/// Run the repair engine on a stored document; `None` when nothing changes
fn repair_document(
    manager: &HintManager,
    engine: &RepairEngine,
    path: &Path,
    document: Document,
    cycles: usize,
) -> anyhow::Result<Option<String>> {
    let report = LintReport {
        hints: document.hints,
        failures: Vec::new(),
    };
    let result = repair_with_cycles(manager, engine, path, &document.text, report, cycles)?;
    Ok(result.changed().then_some(result.new_source))
}

#[tower_lsp::async_trait]
impl LanguageServer for PhpHintsLsp {
    async fn initialize(&self, _: InitializeParams) -> Result<InitializeResult> {
        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Options(TextDocumentSyncOptions {
                    open_close: Some(true),
                    change: Some(TextDocumentSyncKind::FULL),
                    save: Some(TextDocumentSyncSaveOptions::SaveOptions(SaveOptions {
                        include_text: Some(true),
                    })),
                    ..Default::default()
                })),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                code_action_provider: Some(CodeActionProviderCapability::Simple(true)),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "phphints".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        let active: Vec<&str> = self
            .manager
            .adapter_names()
            .into_iter()
            .filter(|name| self.manager.is_active(name))
            .collect();
        self.client
            .log_message(
                MessageType::INFO,
                format!("phphints LSP server initialized ({})", active.join(", ")),
            )
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let document = params.text_document;
        self.check_document(document.uri, document.text).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // full sync: the last change carries the whole text
        let Some(change) = params.content_changes.into_iter().last() else {
            return;
        };
        let mut documents = self.documents.lock().await;
        documents.entry(params.text_document.uri).or_default().text = change.text;
    }

    async fn did_save(&self, params: DidSaveTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = match params.text {
            Some(text) => Some(text),
            None => self.documents.lock().await.get(&uri).map(|d| d.text.clone()),
        };

        if let Some(text) = text {
            self.check_document(uri, text).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.documents.lock().await.remove(&uri);
        self.client.publish_diagnostics(uri, vec![], None).await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let position = params.text_document_position_params.position;
        let uri = params.text_document_position_params.text_document.uri;

        let documents = self.documents.lock().await;
        let tooltip = documents.get(&uri).and_then(|document| {
            tooltip_at(&document.hints, position.line as usize, position.character as usize)
        });

        Ok(tooltip.map(|message| Hover {
            contents: HoverContents::Scalar(MarkedString::String(message)),
            range: None,
        }))
    }

    async fn code_action(&self, params: CodeActionParams) -> Result<Option<CodeActionResponse>> {
        let uri = params.text_document.uri;
        let Some(path) = php_path(&uri) else {
            return Ok(None);
        };
        let Some(document) = self.documents.lock().await.get(&uri).cloned() else {
            return Ok(None);
        };
        if !document.repairable() {
            return Ok(None);
        }

        let end = document_end(&document.text);
        let manager = Arc::clone(&self.manager);
        let engine = Arc::clone(&self.engine);
        let cycles = self.cycles;
        let repaired =
            tokio::task::spawn_blocking(move || repair_document(&manager, &engine, &path, document, cycles)).await;

        let new_text = match repaired {
            Ok(Ok(Some(text))) => text,
            Ok(Ok(None)) => return Ok(None),
            Ok(Err(e)) => {
                logging::entry("lsp", &format!("repair failed for {}: {:#}", uri, e));
                return Ok(None);
            }
            Err(e) => {
                logging::entry("lsp", &format!("repair task failed for {}: {}", uri, e));
                return Ok(None);
            }
        };

        let edit = TextEdit {
            range: Range {
                start: Position::new(0, 0),
                end,
            },
            new_text,
        };
        let mut changes = HashMap::new();
        changes.insert(uri, vec![edit]);

        let action = CodeAction {
            title: REPAIR_TITLE.to_string(),
            kind: Some(CodeActionKind::QUICKFIX),
            diagnostics: Some(params.context.diagnostics),
            edit: Some(WorkspaceEdit {
                changes: Some(changes),
                document_changes: None,
                change_annotations: None,
            }),
            is_preferred: Some(true),
            ..Default::default()
        };

        Ok(Some(vec![CodeActionOrCommand::CodeAction(action)]))
    }
}

/// Run the LSP server on stdin/stdout
pub async fn run_lsp_server(manager: HintManager, engine: RepairEngine, cycles: usize) {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let manager = Arc::new(manager);
    let engine = Arc::new(engine);
    let (service, socket) = LspService::new(move |client| PhpHintsLsp::new(client, manager, engine, cycles));
    Server::new(stdin, stdout, socket).serve(service).await;
}
