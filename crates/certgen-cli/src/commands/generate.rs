//! Generate command - prompt for certificate data and fill the template.

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::{Command, ExitCode};

use clap::Args;
use console::style;
use tracing::{error, info, warn};

use certgen_core::error::ValidationError;
use certgen_core::rules;
use certgen_core::{CertgenConfig, CertificateInput, GenerationOutcome, Generator, Stage};

/// Arguments for the generate command.
#[derive(Args, Default)]
pub struct GenerateArgs {
    /// Do not open the generated document
    #[arg(long)]
    no_open: bool,

    /// Exit without waiting for Enter
    #[arg(long)]
    no_wait: bool,
}

pub fn run(args: GenerateArgs, config: CertgenConfig) -> anyhow::Result<ExitCode> {
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let open_after_save = config.output.open_after_save && !args.no_open;

    let code = match generate(&mut prompter, config, open_after_save) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Critical error: {:#}", e);
            prompter.say(&critical("не удалось запустить генератор, подробности в журнале"))?;
            ExitCode::FAILURE
        }
    };
    finish(&mut prompter, &args, code)
}

/// Report a configuration or log setup failure, then end the run like any other.
///
/// No log sink exists yet, so the detail goes to stderr.
pub fn run_unconfigured(args: GenerateArgs, error: &anyhow::Error) -> anyhow::Result<ExitCode> {
    eprintln!("{error:#}");
    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    prompter.say(&critical("не удалось загрузить настройки"))?;
    finish(&mut prompter, &args, ExitCode::FAILURE)
}

fn finish<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    args: &GenerateArgs,
    code: ExitCode,
) -> anyhow::Result<ExitCode> {
    if !args.no_wait {
        prompter.wait_for_enter()?;
    }
    Ok(code)
}

fn critical(message: &str) -> String {
    format!("\n{} {}", style("КРИТИЧЕСКАЯ ОШИБКА:").red().bold(), message)
}

/// One interactive generation. `Ok(false)` means generation failed and was reported.
fn generate<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    config: CertgenConfig,
    open_after_save: bool,
) -> anyhow::Result<bool> {
    let mut generator = Generator::open(config)?;
    let outcome = match prompter.collect() {
        Ok(input) => generator.generate(&input),
        Err(e) => {
            error!("Generation failed at {}: {}", Stage::CollectInput, e);
            GenerationOutcome::Failed {
                stage: Stage::CollectInput,
                error: e.into(),
            }
        }
    };

    match outcome {
        GenerationOutcome::Generated(certificate) => {
            let rule = "=".repeat(50);
            prompter.say(&format!("\n{rule}"))?;
            prompter.say(&style("СЕРТИФИКАТ УСПЕШНО СОЗДАН!").green().bold().to_string())?;
            prompter.say(&format!("Протокол: {}", certificate.protocol_number))?;
            prompter.say(&format!("Путь к файлу: {}", certificate.output_path.display()))?;
            prompter.say(&rule)?;

            if open_after_save {
                open_in_os(&certificate.output_path);
                if let Some(folder) = certificate.output_path.parent() {
                    open_in_os(folder);
                }
            }
            Ok(true)
        }
        GenerationOutcome::Failed { stage, error } => {
            info!("Generation failed at stage {}: {}", stage, error);
            prompter.say(&format!(
                "\n{} Не удалось создать сертификат",
                style("ОШИБКА:").red().bold()
            ))?;
            Ok(false)
        }
    }
}

/// Line-oriented prompts over any reader/writer pair.
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn say(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{line}")
    }

    /// Print `label` and read one line. Running out of input is an error.
    fn ask(&mut self, label: &str) -> io::Result<String> {
        write!(self.output, "{label}: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed before all fields were entered",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Ask until `parse` accepts the answer.
    fn ask_until<T>(
        &mut self,
        label: &str,
        mut parse: impl FnMut(&str) -> Result<T, ValidationError>,
    ) -> io::Result<T> {
        loop {
            let answer = self.ask(label)?;
            match parse(&answer) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    warn!("Rejected {:?} for {:?}: {}", answer, label, e);
                    self.say(&format!("{} {}", style("Ошибка!").red(), hint(&e)))?;
                }
            }
        }
    }

    /// Prompt for every field, re-asking on invalid answers.
    pub fn collect(&mut self) -> io::Result<CertificateInput> {
        self.say(&format!(
            "\n{}\n",
            style("=== ВВОД ДАННЫХ ДЛЯ СЕРТИФИКАТА ===").bold()
        ))?;

        let full_name = self.ask_until("Введите ФИО", rules::validate_full_name)?;
        let workplace = self.ask_until("Введите место работы", |s| {
            rules::validate_required(s, "workplace")
        })?;
        let position = self.ask_until("Введите должность", |s| {
            rules::validate_required(s, "position")
        })?;
        let qualification_group =
            self.ask_until("Введите группу допуска (2-5)", rules::parse_group)?;
        let cert_date = self.ask_until("Введите дату получения (дд.мм.гггг)", rules::parse_date)?;
        let next_cert_date = self.ask_until("Введите дату следующей проверки (дд.мм.гггг)", |s| {
            let next = rules::parse_date(s)?;
            rules::validate_date_order(cert_date, next)?;
            Ok(next)
        })?;

        Ok(CertificateInput {
            full_name,
            workplace,
            position,
            qualification_group,
            cert_date,
            next_cert_date,
        })
    }

    /// Wait for Enter; a closed input counts as Enter.
    fn wait_for_enter(&mut self) -> io::Result<()> {
        write!(self.output, "\nНажмите Enter для завершения...")?;
        self.output.flush()?;
        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(())
    }
}

/// Message shown to the user for a rejected answer.
fn hint(error: &ValidationError) -> &'static str {
    match error {
        ValidationError::IncompleteName => "Введите полное ФИО",
        ValidationError::EmptyField("workplace") => "Введите место работы",
        ValidationError::EmptyField("position") => "Введите должность",
        ValidationError::EmptyField(_) => "Поле не может быть пустым",
        ValidationError::NotANumber(_) => "Введите число",
        ValidationError::GroupOutOfRange(_) => "Группа должна быть от 2 до 5",
        ValidationError::InvalidDate(_) => "Используйте формат дд.мм.гггг",
        ValidationError::DateOrder { .. } => {
            "Дата следующей проверки должна быть позже даты получения"
        }
    }
}

/// Open a file or folder with the desktop's default handler.
fn open_in_os(path: &Path) {
    let program = if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "macos") {
        "open"
    } else {
        "xdg-open"
    };

    match Command::new(program).arg(path).spawn() {
        Ok(_) => info!("Opened {}", path.display()),
        Err(e) => warn!("Failed to open {} with {}: {}", path.display(), program, e),
    }
}
