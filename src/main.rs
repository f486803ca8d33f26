//! Application entry point — Voz Gala announcer.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Parse command-line arguments.
//! 3. Load [`AppConfig`] from disk (returns default on first run).
//! 4. Build the Gemini collaborators and the audio output (graceful
//!    fallback to a silent output when no device is available).
//! 5. Run one generation on the tokio runtime, printing progress events.
//! 6. Print the script, export the WAV, wait for playback to finish.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::mpsc;
use voz_gala::{
    audio::{AudioOutput, NullOutput, RodioOutput},
    config::{AppConfig, AppPaths},
    history::HistoryStore,
    pipeline::{GenerationOrchestrator, GenerationRequest, PipelineEvent},
    text::mask_key,
    tts::{AnnouncerGender, AnnouncerStyle, GeminiRewriter, GeminiSynthesizer},
};

// ---------------------------------------------------------------------------
// Argument parsing
// ---------------------------------------------------------------------------

const USAGE: &str = "\
Uso: voz-gala [OPCIONES] <TEXTO>

Opciones:
  --style <epic|professional|real>   Estilo de locución (por defecto: epic)
  --gender <male|female>             Voz del locutor (por defecto: male)
  --author <NOMBRE>                  Autor registrado en el historial
  --export-dir <DIR>                 Carpeta de exportación del WAV
  --no-play                          No reproducir el audio generado
  -h, --help                         Mostrar esta ayuda";

struct CliArgs {
    text: String,
    style: AnnouncerStyle,
    gender: AnnouncerGender,
    author: String,
    export_dir: Option<PathBuf>,
    play: bool,
}

/// What the command line asked for: a generation run, or just the usage text.
enum CliCommand {
    Run(CliArgs),
    Help,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<CliCommand, String> {
    let mut style = AnnouncerStyle::Epic;
    let mut gender = AnnouncerGender::Male;
    let mut author = whoami_fallback();
    let mut export_dir = None;
    let mut play = true;
    let mut words: Vec<String> = Vec::new();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--style" => {
                let value = args.next().ok_or("--style requiere un valor")?;
                style = AnnouncerStyle::parse(&value)
                    .ok_or_else(|| format!("estilo no reconocido: {value}"))?;
            }
            "--gender" => {
                let value = args.next().ok_or("--gender requiere un valor")?;
                gender = AnnouncerGender::parse(&value)
                    .ok_or_else(|| format!("género no reconocido: {value}"))?;
            }
            "--author" => {
                author = args.next().ok_or("--author requiere un valor")?;
            }
            "--export-dir" => {
                let value = args.next().ok_or("--export-dir requiere un valor")?;
                export_dir = Some(PathBuf::from(value));
            }
            "--no-play" => play = false,
            "-h" | "--help" => return Ok(CliCommand::Help),
            other if other.starts_with("--") => {
                return Err(format!("opción desconocida: {other}\n\n{USAGE}"));
            }
            _ => words.push(arg),
        }
    }

    if words.is_empty() {
        return Err(format!("falta el texto a locutar\n\n{USAGE}"));
    }

    Ok(CliCommand::Run(CliArgs {
        text: words.join(" "),
        style,
        gender,
        author,
        export_dir,
        play,
    }))
}

fn whoami_fallback() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "Anónimo".into())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Voz Gala starting up");

    // 2. Arguments
    let cli = match parse_args(std::env::args().skip(1)) {
        Ok(CliCommand::Run(cli)) => cli,
        Ok(CliCommand::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::FAILURE;
        }
    };

    // 3. Configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    log::info!("API key: {}", mask_key(config.api.resolved_key().as_deref()));

    // 4. Collaborators
    let paths = AppPaths::new();
    let history = HistoryStore::load_from(&paths.history_file, config.history.max_entries);

    let rewriter = Arc::new(GeminiRewriter::from_config(&config.api));
    let synthesizer = Arc::new(GeminiSynthesizer::from_config(&config.api));

    let output: Arc<dyn AudioOutput> = if cli.play {
        match RodioOutput::new() {
            Ok(output) => Arc::new(output),
            Err(e) => {
                log::warn!("Audio device unavailable ({e}); playback disabled");
                Arc::new(NullOutput)
            }
        }
    } else {
        Arc::new(NullOutput)
    };

    let export_dir = cli.export_dir.clone().unwrap_or(paths.exports_dir.clone());

    // 5. Tokio runtime (2 workers — rewrite + synthesis run sequentially,
    //    the second worker services playback/event tasks)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("failed to create tokio runtime");

    let (event_tx, event_rx) = mpsc::channel::<PipelineEvent>(32);

    let mut orchestrator =
        GenerationOrchestrator::new(config, rewriter, synthesizer, output, history)
            .with_events(event_tx);

    let request = GenerationRequest {
        text: cli.text,
        style: cli.style,
        gender: cli.gender,
        author: cli.author,
    };

    rt.block_on(run(&mut orchestrator, request, &export_dir, event_rx))
}

/// One full generation: progress on stderr, the script on stdout, the WAV
/// on disk, then wait for playback to finish.
async fn run(
    orchestrator: &mut GenerationOrchestrator,
    request: GenerationRequest,
    export_dir: &std::path::Path,
    mut event_rx: mpsc::Receiver<PipelineEvent>,
) -> ExitCode {
    let progress = tokio::spawn(async move {
        let mut finished = false;
        while let Some(event) = event_rx.recv().await {
            match event {
                PipelineEvent::StateChanged(state) => {
                    eprintln!("[{}]", state.label());
                }
                PipelineEvent::ScriptReady { .. } => {}
                PipelineEvent::Ready {
                    frames,
                    duration_secs,
                } => {
                    eprintln!("[audio listo: {frames} muestras, {duration_secs:.2}s]");
                }
                PipelineEvent::PlaybackFinished => {
                    finished = true;
                    break;
                }
                PipelineEvent::CooldownTick { .. } => {}
                PipelineEvent::Error { message } => {
                    eprintln!("Error: {message}");
                }
            }
        }
        finished
    });

    if orchestrator.generate(request).await.is_err() {
        // The error event already reported the message.
        return ExitCode::FAILURE;
    }

    if let Some(script) = orchestrator.script() {
        println!("{script}");
    }

    match orchestrator.export_wav(export_dir) {
        Ok(path) => eprintln!("[exportado: {}]", path.display()),
        Err(e) => {
            eprintln!("Error al exportar: {e}");
            return ExitCode::FAILURE;
        }
    }

    // Wait for natural playback completion, bounded by the audio length
    // (playback rate can stretch it up to 2x) plus a small margin.
    let duration_secs = orchestrator
        .master_buffer()
        .map(|b| b.duration_secs())
        .unwrap_or(0.0);
    let deadline = std::time::Duration::from_secs_f32(duration_secs * 2.0 + 3.0);

    match tokio::time::timeout(deadline, progress).await {
        Ok(Ok(true)) => eprintln!("[reproducción completada]"),
        Ok(_) => {}
        Err(_) => log::warn!("playback did not report completion in time"),
    }

    ExitCode::SUCCESS
}
