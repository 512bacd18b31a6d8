use ratatui::widgets::ListState;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::balance::{BalanceDisplay, BalanceState};
use crate::client::{AskReply, BackendClient, BalanceInfo, ClientError};
use crate::config::Config;
use crate::pipeline::{RequestPipeline, SubmitRefusal};
use crate::render::AnswerRenderer;

pub struct App {
    // Core state
    pub should_quit: bool,

    // Input line state
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Transcript view state
    pub transcript_scroll: u16,
    pub follow_bottom: bool,
    pub transcript_height: u16, // inner chat area height, updated during render
    pub transcript_width: u16,  // inner chat area width, updated during render
    pub transcript_total_lines: u16,

    // Request pipeline (owns session + transcript)
    pub pipeline: RequestPipeline,
    pub ask_task: Option<JoinHandle<Result<AskReply, ClientError>>>,

    // Wallet state
    pub balance: BalanceDisplay,
    pub balance_task: Option<JoinHandle<Result<BalanceInfo, ClientError>>>,

    // Preset prompt picker
    pub show_preset_picker: bool,
    pub presets: Vec<String>,
    pub preset_state: ListState,

    // Animation state
    pub animation_frame: u8, // 0-2 for the thinking ellipsis

    pub renderer: AnswerRenderer,
    pub client: BackendClient,
}

impl App {
    pub fn new(client: BackendClient, config: &Config) -> Self {
        Self {
            should_quit: false,

            input: String::new(),
            input_cursor: 0,

            transcript_scroll: 0,
            follow_bottom: true,
            transcript_height: 0,
            transcript_width: 0,
            transcript_total_lines: 0,

            pipeline: RequestPipeline::new(),
            ask_task: None,

            balance: BalanceDisplay::Pending,
            balance_task: None,

            show_preset_picker: false,
            presets: config.presets(),
            preset_state: ListState::default(),

            animation_frame: 0,

            renderer: AnswerRenderer::new(),
            client,
        }
    }

    /// Submit whatever is in the input box.
    pub fn submit_input(&mut self) {
        let text = self.input.clone();
        self.submit(&text);
    }

    /// Submit a question (typed or preset) through the pipeline guard.
    ///
    /// The user message lands in the session and transcript before the
    /// request is dispatched. Submissions while a request is outstanding
    /// are ignored.
    pub fn submit(&mut self, text: &str) {
        match self.pipeline.begin(text) {
            Ok(question) => {
                self.input.clear();
                self.input_cursor = 0;
                self.follow_bottom = true;

                info!(
                    turn = self.pipeline.session().len(),
                    chars = question.len(),
                    "dispatching question"
                );
                let client = self.client.clone();
                self.ask_task = Some(tokio::spawn(async move { client.ask(&question).await }));
            }
            Err(SubmitRefusal::EmptyInput) => {
                // Validation banner is already in the transcript
                self.follow_bottom = true;
            }
            Err(SubmitRefusal::Busy) => {}
        }
    }

    /// Start the wallet balance fetch unless one is already running.
    pub fn refresh_balance(&mut self) {
        if self.balance_task.is_some() {
            return;
        }
        let client = self.client.clone();
        self.balance_task = Some(tokio::spawn(async move { client.get_balance().await }));
    }

    /// Reap finished background tasks. Called on every turn of the event
    /// loop; the tick event guarantees it runs while requests are pending.
    pub async fn poll_tasks(&mut self) {
        let ask_finished = self.ask_task.as_ref().is_some_and(|task| task.is_finished());
        if let Some(task) = ask_finished.then(|| self.ask_task.take()).flatten() {
            let outcome = match task.await {
                Ok(result) => result,
                Err(join_err) => Err(ClientError::Task(join_err.to_string())),
            };

            if let Err(err) = &outcome {
                warn!(error = %err, "ask request failed");
            }

            if let Some(state) = self.pipeline.complete(outcome) {
                self.balance = BalanceDisplay::Known(state);
            }
            self.follow_bottom = true;
        }

        let balance_finished = self
            .balance_task
            .as_ref()
            .is_some_and(|task| task.is_finished());
        if let Some(task) = balance_finished.then(|| self.balance_task.take()).flatten() {
            match task.await {
                Ok(Ok(info)) => {
                    info!(balance = info.balance, "wallet balance fetched");
                    self.balance = BalanceDisplay::Known(BalanceState {
                        amount: info.balance,
                        currency: info.currency,
                        last_cost: 0.0,
                    });
                }
                Ok(Err(err)) => {
                    warn!(error = %err, "balance fetch failed");
                    self.balance = BalanceDisplay::Unavailable;
                }
                Err(join_err) => {
                    warn!(error = %join_err, "balance task failed");
                    self.balance = BalanceDisplay::Unavailable;
                }
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.pipeline.is_sending() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Transcript scrolling. Scrolling up disengages follow-bottom;
    // reaching the end re-engages it.
    pub fn scroll_up(&mut self, lines: u16) {
        self.follow_bottom = false;
        self.transcript_scroll = self.transcript_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let max = self.max_transcript_scroll();
        self.transcript_scroll = self.transcript_scroll.saturating_add(lines).min(max);
        if self.transcript_scroll >= max {
            self.follow_bottom = true;
        }
    }

    pub fn scroll_half_page_up(&mut self) {
        self.scroll_up((self.transcript_height / 2).max(1));
    }

    pub fn scroll_half_page_down(&mut self) {
        self.scroll_down((self.transcript_height / 2).max(1));
    }

    pub fn max_transcript_scroll(&self) -> u16 {
        self.transcript_total_lines
            .saturating_sub(self.transcript_height)
    }

    // Preset picker
    pub fn open_preset_picker(&mut self) {
        if self.presets.is_empty() {
            return;
        }
        self.preset_state.select(Some(0));
        self.show_preset_picker = true;
    }

    pub fn preset_nav_down(&mut self) {
        let len = self.presets.len();
        if len > 0 {
            let i = self.preset_state.selected().unwrap_or(0);
            self.preset_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn preset_nav_up(&mut self) {
        let i = self.preset_state.selected().unwrap_or(0);
        self.preset_state.select(Some(i.saturating_sub(1)));
    }

    /// Submit the highlighted preset through the same pipeline as typed
    /// input, then close the picker.
    pub fn submit_selected_preset(&mut self) {
        if let Some(i) = self.preset_state.selected() {
            if let Some(preset) = self.presets.get(i).cloned() {
                self.submit(&preset);
            }
        }
        self.show_preset_picker = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::TranscriptEntry;

    fn test_app() -> App {
        App::new(BackendClient::new("http://localhost:59999"), &Config::new())
    }

    #[tokio::test]
    async fn test_submit_clears_input_and_spawns_request() {
        let mut app = test_app();
        app.input = "what is a sat?".to_string();
        app.input_cursor = app.input.chars().count();

        app.submit_input();

        assert!(app.input.is_empty());
        assert_eq!(app.input_cursor, 0);
        assert!(app.pipeline.is_sending());
        assert!(app.ask_task.is_some());
    }

    #[tokio::test]
    async fn test_submit_empty_input_shows_banner_without_request() {
        let mut app = test_app();
        app.input = "   ".to_string();

        app.submit_input();

        assert!(app.ask_task.is_none());
        assert!(!app.pipeline.is_sending());
        assert!(matches!(
            app.pipeline.transcript().entries().last(),
            Some(TranscriptEntry::Error(_))
        ));
        // Input is left as typed on a validation failure
        assert_eq!(app.input, "   ");
    }

    #[tokio::test]
    async fn test_submit_while_sending_is_ignored() {
        let mut app = test_app();
        app.input = "first".to_string();
        app.submit_input();

        app.input = "second".to_string();
        app.submit_input();

        // Second submission refused: input untouched, session unchanged
        assert_eq!(app.input, "second");
        assert_eq!(app.pipeline.session().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_balance_does_not_stack_fetches() {
        let mut app = test_app();
        app.refresh_balance();
        assert!(app.balance_task.is_some());

        // Second call while the first is outstanding is a no-op; the
        // handle is not replaced.
        app.refresh_balance();
        assert!(app.balance_task.is_some());
    }

    #[test]
    fn test_animation_only_advances_while_sending() {
        let mut app = test_app();
        app.tick_animation();
        assert_eq!(app.animation_frame, 0);
    }
}
