use std::io::stdout;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use ratatui::DefaultTerminal;

use crate::app::{App, Message, Model, ToastLevel, update};
use crate::watcher::{DraftWatcher, WatchStatus};

use super::effects::{file_change_message, handle_message_side_effects, make_draft_watcher};
use super::input::handle_event;

impl App {
    /// Run the editor until the user quits.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft cannot be read, the terminal cannot be
    /// initialized, or drawing fails.
    pub fn run(&mut self) -> Result<()> {
        let _run_scope = crate::perf::scope("app.run.total");

        // Read before touching the terminal so errors print normally.
        let read_scope = crate::perf::scope("app.read_file");
        let model = Model::open(&self.file_path, (80, 24))?;
        drop(read_scope);

        let init_scope = crate::perf::scope("app.ratatui_init");
        let mut terminal = ratatui::try_init()
            .context("Failed to initialize terminal; draftpad edit needs an interactive terminal")?;
        let size = terminal.size()?;
        drop(init_scope);
        let _ = execute!(stdout(), EnableMouseCapture, EnableBracketedPaste);

        let mut model = self.configure(model);
        model = update(model, Message::Resize(size.width, size.height));
        if !self.file_path.exists() {
            model.show_toast(ToastLevel::Info, "New file; Ctrl+S creates it");
        }

        let result = Self::event_loop(&mut terminal, &mut model);

        let _ = execute!(stdout(), DisableBracketedPaste, DisableMouseCapture);
        ratatui::restore();
        result
    }

    fn configure(&self, model: Model) -> Model {
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| model.title.clone());
        let mut model = model
            .with_title(title)
            .with_options(self.options)
            .with_max_tokens(self.max_tokens);
        model.status = self.status;
        model.post_id = self.post_id;
        model.watch_enabled = self.watch_enabled;
        model
            .config_global_path
            .clone_from(&self.config_global_path);
        model.config_local_path.clone_from(&self.config_local_path);
        model
    }

    fn event_loop(terminal: &mut DefaultTerminal, model: &mut Model) -> Result<()> {
        let mut watcher = if model.watch_enabled {
            match make_draft_watcher(&model.file_path) {
                Ok(w) => Some(w),
                Err(err) => {
                    model.watch_enabled = false;
                    model.show_toast(ToastLevel::Warning, format!("Watch unavailable: {err}"));
                    crate::perf::log_event(
                        "watcher.error",
                        format!("failed path={} err={err}", model.file_path.display()),
                    );
                    None
                }
            }
        } else {
            None
        };
        let mut frame_idx: u64 = 0;
        let mut needs_render = true;

        loop {
            if model.expire_toast(Instant::now()) {
                needs_render = true;
            }

            let watch_status = watcher.as_mut().map_or(WatchStatus::Idle, DraftWatcher::poll);
            if model.watch_enabled && watch_status == WatchStatus::Changed {
                if let Some(msg) = file_change_message(model) {
                    dispatch(model, &mut watcher, msg);
                    needs_render = true;
                }
            }

            let poll_ms = match (needs_render, watch_status) {
                (true, _) => 0,
                (false, WatchStatus::Settling) => 20,
                (false, _) => 250,
            };
            if event::poll(Duration::from_millis(poll_ms))? {
                if let Some(msg) = handle_event(&event::read()?, model) {
                    crate::perf::log_event(
                        "event.message",
                        format!("frame={frame_idx} msg={msg:?}"),
                    );
                    dispatch(model, &mut watcher, msg);
                    needs_render = true;
                }

                // Coalesce key repeat bursts and pastes into a single render.
                let mut drained = 0_u32;
                while event::poll(Duration::from_millis(0))? {
                    if let Some(msg) = handle_event(&event::read()?, model) {
                        drained += 1;
                        dispatch(model, &mut watcher, msg);
                        needs_render = true;
                    }
                }
                if drained > 0 {
                    crate::perf::log_event(
                        "event.drain",
                        format!("frame={frame_idx} drained={drained}"),
                    );
                }
            }

            if needs_render {
                frame_idx += 1;
                let draw_start = Instant::now();
                terminal.draw(|frame| crate::ui::render(model, frame))?;
                crate::perf::log_event(
                    "frame.draw",
                    format!(
                        "frame={} draw_ms={:.3}",
                        frame_idx,
                        draw_start.elapsed().as_secs_f64() * 1000.0
                    ),
                );
                needs_render = false;
            }

            if model.should_quit {
                break;
            }
        }
        Ok(())
    }
}

fn dispatch(model: &mut Model, watcher: &mut Option<DraftWatcher>, msg: Message) {
    let side_msg = msg.clone();
    *model = update(std::mem::take(model), msg);
    handle_message_side_effects(model, watcher, &side_msg);
}
