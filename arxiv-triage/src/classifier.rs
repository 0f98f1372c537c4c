use crate::config::ClassifierConfig;
use crate::traits::RelevanceClassifier;
use crate::types::Verdict;
use async_trait::async_trait;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

const EMPTY_ANSWER: &str = "(empty)";
const MODEL_PLACEHOLDER: &str = "{model}";

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("failed to start classifier `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to send prompt to classifier: {0}")]
    Stdin(#[source] std::io::Error),

    #[error("failed waiting for classifier: {0}")]
    Wait(#[source] std::io::Error),

    #[error("classifier exited with {code:?}: {stderr}")]
    ExitStatus { code: Option<i32>, stderr: String },

    #[error("classifier did not answer within {seconds}s")]
    Timeout { seconds: u64 },
}

/// Build the one-shot instruction sent to the classifier for a single paper.
pub fn build_prompt(criteria: &[String], title: &str, abstract_text: &str) -> String {
    let mut prompt = String::from("Is this paper substantially related to any of these topics?\n");
    for criterion in criteria {
        prompt.push_str("- ");
        prompt.push_str(criterion);
        prompt.push('\n');
    }
    prompt.push_str(&format!(
        "\nTitle: {}\nAbstract: {}\n\nRespond with ONLY one word: YES or NO. Do not explain.",
        title.trim(),
        abstract_text.trim()
    ));
    prompt
}

/// Normalize raw classifier output into a verdict.
///
/// Only a leading `YES` counts as relevant. Anything that is neither `YES`
/// nor `NO` is logged and treated as not relevant.
pub fn parse_answer(output: &str) -> Verdict {
    let Some(first) = output.split_whitespace().next() else {
        warn!(stage = "classify", "Empty classifier answer, treating as NOT RELEVANT");
        return Verdict::not_relevant(EMPTY_ANSWER);
    };

    let token = first
        .trim_end_matches(|c: char| matches!(c, '.' | ',' | '!' | '?' | ':' | ';'))
        .to_uppercase();

    match token.as_str() {
        "YES" => Verdict::relevant(token),
        "NO" => Verdict::not_relevant(token),
        _ => {
            warn!(stage = "classify", answer = %token, "Unexpected classifier answer, treating as NOT RELEVANT");
            Verdict::not_relevant(token)
        }
    }
}

/// Classifier backed by a local command, `ollama run <model>` by default.
///
/// Each call spawns a fresh process, writes the prompt to its stdin and reads
/// the whole of stdout once it exits.
pub struct CommandClassifier {
    config: ClassifierConfig,
}

impl CommandClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    fn command_args(&self) -> Vec<String> {
        self.config
            .args
            .iter()
            .map(|arg| arg.replace(MODEL_PLACEHOLDER, &self.config.model))
            .collect()
    }

    async fn invoke(&self, prompt: &str) -> Result<String, ClassifierError> {
        let mut child = Command::new(&self.config.program)
            .args(self.command_args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ClassifierError::Spawn {
                program: self.config.program.clone(),
                source,
            })?;

        let exchange = async {
            if let Some(mut stdin) = child.stdin.take() {
                stdin.write_all(prompt.as_bytes()).await.map_err(ClassifierError::Stdin)?;
                // Dropping stdin closes the pipe so the child sees EOF.
            }
            let output = child.wait_with_output().await.map_err(ClassifierError::Wait)?;
            Ok::<_, ClassifierError>(output)
        };

        // One deadline for writing the prompt and collecting the answer.
        let seconds = self.config.timeout_secs;
        let output = tokio::time::timeout(Duration::from_secs(seconds), exchange)
            .await
            .map_err(|_| ClassifierError::Timeout { seconds })??;

        if !output.status.success() {
            return Err(ClassifierError::ExitStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl RelevanceClassifier for CommandClassifier {
    fn model_name(&self) -> String {
        self.config.model.clone()
    }

    async fn classify(&self, title: &str, abstract_text: &str) -> Result<Verdict, ClassifierError> {
        let prompt = build_prompt(&self.config.criteria, title, abstract_text);
        debug!(
            stage = "classify",
            model = %self.config.model,
            prompt_chars = prompt.chars().count(),
            abstract_chars = abstract_text.chars().count(),
            "Calling classifier"
        );

        let started = Instant::now();
        let output = self.invoke(&prompt).await?;
        debug!(stage = "classify", elapsed_ms = started.elapsed().as_millis() as u64, "Classifier answered");
        log_raw_output(&output);

        let verdict = parse_answer(&output);
        debug!(stage = "classify", answer = %verdict.answer, relevant = verdict.relevant, "Parsed verdict");
        Ok(verdict)
    }
}

fn log_raw_output(output: &str) {
    let chars = output.chars().count();
    if chars == 0 {
        debug!(stage = "classify", "Raw classifier output: (EMPTY)");
    } else if chars <= 500 {
        debug!(stage = "classify", chars, "Raw classifier output: {}", output);
    } else {
        let head: String = output.chars().take(500).collect();
        let tail: String = output.chars().skip(chars - 200).collect();
        debug!(stage = "classify", chars, "Raw classifier output: {}... ...{}", head, tail);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affirmative_answers() {
        for output in ["YES", "yes.", "Yes!", "  yes, it is related"] {
            let verdict = parse_answer(output);
            assert!(verdict.relevant, "{output:?} should be relevant");
            assert_eq!(verdict.answer, "YES");
        }
    }

    #[test]
    fn negative_and_malformed_answers() {
        assert_eq!(parse_answer("NO"), Verdict::not_relevant("NO"));
        assert_eq!(parse_answer("no."), Verdict::not_relevant("NO"));
        assert_eq!(parse_answer(""), Verdict::not_relevant("(empty)"));
        assert_eq!(parse_answer("   \n "), Verdict::not_relevant("(empty)"));
        assert_eq!(parse_answer("MAYBE"), Verdict::not_relevant("MAYBE"));
        assert_eq!(parse_answer("Yesterday"), Verdict::not_relevant("YESTERDAY"));
    }

    #[test]
    fn prompt_embeds_criteria_and_paper() {
        let criteria = vec!["Text-to-table".to_string(), "Semi-structured data analysis".to_string()];
        let prompt = build_prompt(&criteria, " A Title ", "An abstract.");
        assert!(prompt.contains("- Text-to-table\n- Semi-structured data analysis\n"));
        assert!(prompt.contains("Title: A Title\n"));
        assert!(prompt.contains("Abstract: An abstract.\n"));
        assert!(prompt.ends_with("Respond with ONLY one word: YES or NO. Do not explain."));
    }

    #[test]
    fn model_placeholder_is_substituted() {
        let classifier = CommandClassifier::new(ClassifierConfig {
            model: "gemma2:2b".to_string(),
            ..ClassifierConfig::default()
        });
        assert_eq!(classifier.command_args(), vec!["run".to_string(), "gemma2:2b".to_string()]);
    }
}
