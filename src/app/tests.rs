use std::path::PathBuf;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tempfile::tempdir;

use crate::editor::{Direction, DraftBuffer};
use crate::post::PostStatus;
use crate::preview::PreviewOptions;

use super::effects::{file_change_message, handle_message_side_effects};
use super::input::{handle_event, handle_key};
use super::{Message, Model, PreviewView, ToastLevel, update};

fn create_test_model(text: &str) -> Model {
    Model::new(
        PathBuf::from("test.md"),
        DraftBuffer::from_text(text),
        (80, 24),
    )
}

fn type_text(mut model: Model, text: &str) -> Model {
    for ch in text.chars() {
        model = if ch == '\n' {
            update(model, Message::SplitLine)
        } else {
            update(model, Message::InsertChar(ch))
        };
    }
    model
}

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn ctrl(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
}

#[test]
fn test_new_model_renders_initial_preview() {
    let model = create_test_model("# Hi");
    assert_eq!(model.preview.html(), "<p><h1>Hi</h1></p>");
    assert_eq!(model.preview.html_revision(), Some(model.buffer.revision()));
}

#[test]
fn test_every_keystroke_refreshes_preview() {
    let model = create_test_model("");
    let model = update(model, Message::InsertChar('*'));
    assert_eq!(model.preview.html(), "<p>*</p>");

    let model = type_text(model, "*bold**");
    assert_eq!(model.preview.html(), "<p><strong>bold</strong></p>");

    let model = update(model, Message::DeleteBack);
    assert_eq!(model.preview.html(), "<p><em>*bold</em></p>");
}

#[test]
fn test_enter_produces_line_break_in_preview() {
    let model = type_text(create_test_model(""), "a\nb");
    assert_eq!(model.preview.html(), "<p>a<br>b</p>");

    let model = type_text(model, "\n\nc");
    assert_eq!(model.preview.html(), "<p>a<br>b</p><p>c</p>");
}

#[test]
fn test_cursor_moves_do_not_rerender() {
    let model = create_test_model("hello");
    let revision = model.preview.html_revision();
    let model = update(model, Message::MoveCursor(Direction::Right));
    let model = update(model, Message::MoveEnd);
    assert_eq!(model.preview.html_revision(), revision);
    assert!(!model.buffer.is_dirty());
}

#[test]
fn test_highlighted_preview_is_cached_per_revision() {
    let mut model = create_test_model("# Title\n\nbody");
    assert_eq!(model.preview.highlighted().len(), model.preview.line_count());
    assert!(model.preview.line_count() > 1);

    model = update(model, Message::MoveToEnd);
    assert!(!model.sync_preview(), "nothing to recompute after a cursor move");

    let before = model.preview.highlighted().len();
    model = type_text(model, "\n\nmore");
    assert!(model.preview.highlighted().len() > before);
}

#[test]
fn test_paste_inserts_text() {
    let model = update(
        create_test_model(""),
        Message::InsertText("## Title\nbody".to_string()),
    );
    assert_eq!(model.buffer.text(), "## Title\nbody");
    assert_eq!(model.preview.html(), "<p><h2>Title</h2><br>body</p>");
}

#[test]
fn test_escape_html_option_applies_to_live_preview() {
    let model = create_test_model("<b>x</b>").with_options(PreviewOptions { escape_html: true });
    assert_eq!(model.preview.html(), "<p>&lt;b&gt;x&lt;/b&gt;</p>");
}

#[test]
fn test_cycle_view_computes_chunks() {
    let model = create_test_model("## A\none.\n## B\ntwo.").with_title("Post");
    assert!(model.preview.chunks().is_empty());

    let model = update(model, Message::CycleView);
    assert_eq!(model.preview.view, PreviewView::Chunks);
    assert_eq!(
        model.preview.chunks(),
        ["# Post\n## A\none.", "# Post\n## B\ntwo."]
    );
    assert!(model.active_toast().is_some());

    let model = update(model, Message::CycleView);
    assert_eq!(model.preview.view, PreviewView::Html);
}

#[test]
fn test_chunk_view_follows_edits() {
    let model = update(create_test_model("## A\nx.").with_title("T"), Message::CycleView);
    let model = update(model, Message::MoveToEnd);
    let model = type_text(model, "\n## B\ny.");
    assert_eq!(model.preview.chunks().len(), 2);
}

#[test]
fn test_preview_scroll_is_clamped() {
    let model = create_test_model("a\nb\nc");
    let model = update(model, Message::PreviewScrollDown(100));
    assert_eq!(model.preview.scroll, model.preview.line_count() - 1);

    let model = update(model, Message::PreviewScrollUp(100));
    assert_eq!(model.preview.scroll, 0);
}

#[test]
fn test_toggle_status_flips_and_notifies() {
    let model = create_test_model("x");
    assert_eq!(model.status, PostStatus::Published);
    let model = update(model, Message::ToggleStatus);
    assert_eq!(model.status, PostStatus::Draft);
    assert_eq!(
        model.active_toast().map(|(_, level)| level),
        Some(ToastLevel::Info)
    );
}

#[test]
fn test_quit_with_clean_buffer_quits_immediately() {
    let model = update(create_test_model("x"), Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_quit_with_unsaved_changes_needs_confirmation() {
    let model = update(create_test_model(""), Message::InsertChar('x'));
    let model = update(model, Message::Quit);
    assert!(!model.should_quit);
    assert!(model.quit_confirmed);

    let model = update(model, Message::Quit);
    assert!(model.should_quit);
}

#[test]
fn test_quit_confirmation_resets_on_other_input() {
    let model = update(create_test_model(""), Message::InsertChar('x'));
    let model = update(model, Message::Quit);
    let model = update(model, Message::MoveHome);
    assert!(!model.quit_confirmed);
    let model = update(model, Message::Quit);
    assert!(!model.should_quit);
}

#[test]
fn test_file_changed_with_clean_buffer_requests_reload() {
    let model = update(create_test_model("x"), Message::FileChanged);
    assert!(model.reload_requested);
    assert!(!model.disk_conflict);
}

#[test]
fn test_file_changed_with_dirty_buffer_flags_conflict() {
    let model = update(create_test_model(""), Message::InsertChar('x'));
    let model = update(model, Message::FileChanged);
    assert!(!model.reload_requested);
    assert!(model.disk_conflict);
    assert_eq!(
        model.active_toast().map(|(_, level)| level),
        Some(ToastLevel::Warning)
    );
}

#[test]
fn test_force_reload_with_dirty_buffer_needs_confirmation() {
    let model = update(create_test_model(""), Message::InsertChar('x'));
    let model = update(model, Message::ForceReload);
    assert!(!model.reload_requested);
    let model = update(model, Message::ForceReload);
    assert!(model.reload_requested);
}

#[test]
fn test_force_reload_side_effect_reads_disk() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("post.md");
    std::fs::write(&path, "# Old").unwrap();
    let mut model = Model::open(&path, (80, 24)).unwrap();

    std::fs::write(&path, "# New").unwrap();
    model = update(model, Message::ForceReload);
    handle_message_side_effects(&mut model, &mut None, &Message::ForceReload);

    assert_eq!(model.buffer.text(), "# New");
    assert_eq!(model.preview.html(), "<p><h1>New</h1></p>");
    assert!(!model.reload_requested);
    assert!(!model.buffer.is_dirty());
}

#[test]
fn test_save_writes_buffer_and_marks_clean() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("new.md");
    let mut model = Model::open(&path, (80, 24)).unwrap();
    assert_eq!(model.buffer.text(), "");

    model = type_text(model, "hello");
    assert!(model.buffer.is_dirty());
    model = update(model, Message::Save);
    handle_message_side_effects(&mut model, &mut None, &Message::Save);

    assert_eq!(std::fs::read_to_string(&path).unwrap(), "hello");
    assert!(!model.buffer.is_dirty());
}

#[test]
fn test_own_save_is_not_reported_as_external_change() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("post.md");
    std::fs::write(&path, "# Post").unwrap();
    let mut model = Model::open(&path, (80, 24)).unwrap();
    assert_eq!(file_change_message(&model), None);

    model = type_text(model, "x");
    model = update(model, Message::Save);
    handle_message_side_effects(&mut model, &mut None, &Message::Save);
    // Typing resumes before the watcher's notification for the save arrives.
    model = type_text(model, "y");

    assert_eq!(file_change_message(&model), None);
    assert!(!model.disk_conflict);
    assert!(model.active_toast().is_some_and(|(msg, _)| msg.starts_with("Saved")));
}

#[test]
fn test_outside_write_after_save_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("post.md");
    let mut model = Model::open(&path, (80, 24)).unwrap();
    model = type_text(model, "mine");
    handle_message_side_effects(&mut model, &mut None, &Message::Save);
    model = type_text(model, "!");

    std::fs::write(&path, "theirs").unwrap();
    let msg = file_change_message(&model).unwrap();
    assert_eq!(msg, Message::FileChanged);
    let model = update(model, msg);
    assert!(model.disk_conflict);
}

#[test]
fn test_reloaded_content_is_not_a_change() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("post.md");
    std::fs::write(&path, "# Old").unwrap();
    let mut model = Model::open(&path, (80, 24)).unwrap();

    std::fs::write(&path, "# New").unwrap();
    assert_eq!(file_change_message(&model), Some(Message::FileChanged));
    model = update(model, Message::FileChanged);
    handle_message_side_effects(&mut model, &mut None, &Message::FileChanged);
    assert_eq!(model.buffer.text(), "# New");
    assert_eq!(file_change_message(&model), None);
}

#[test]
fn test_export_writes_payload_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hello.md");
    std::fs::write(&path, "  Body text  ").unwrap();
    let mut model = Model::open(&path, (80, 24)).unwrap();
    model = update(model, Message::ToggleStatus);
    handle_message_side_effects(&mut model, &mut None, &Message::Export);

    let exported = dir.path().join("hello.post.json");
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(exported).unwrap()).unwrap();
    assert_eq!(json["title"], "hello");
    assert_eq!(json["content"], "Body text");
    assert_eq!(json["status"], "draft");
    assert!(json.get("id").is_none());
}

#[test]
fn test_export_of_existing_post_includes_id() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("hello.md");
    std::fs::write(&path, "Body").unwrap();
    let mut model = Model::open(&path, (80, 24)).unwrap();
    model.post_id = Some(7);
    handle_message_side_effects(&mut model, &mut None, &Message::Export);

    let json: serde_json::Value = serde_json::from_str(
        &std::fs::read_to_string(dir.path().join("hello.post.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["id"], 7);
}

#[test]
fn test_export_of_empty_content_warns_and_writes_nothing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty.md");
    let mut model = Model::open(&path, (80, 24)).unwrap();
    handle_message_side_effects(&mut model, &mut None, &Message::Export);

    assert!(!dir.path().join("empty.post.json").exists());
    let (message, level) = model.active_toast().unwrap();
    assert_eq!(level, ToastLevel::Warning);
    assert!(message.contains("Content must not be empty"));
}

#[test]
fn test_export_path_uses_file_stem() {
    let model = Model::new(
        PathBuf::from("drafts/launch.md"),
        DraftBuffer::empty(),
        (80, 24),
    );
    assert_eq!(model.export_path(), PathBuf::from("drafts/launch.post.json"));
}

#[test]
fn test_default_title_is_file_stem() {
    let model = create_test_model("");
    assert_eq!(model.title, "test");
    assert_eq!(super::default_title(&PathBuf::new()), "Untitled");
}

#[test]
fn test_editor_scroll_follows_cursor() {
    let text = (0..100).map(|i| format!("line {i}")).collect::<Vec<_>>().join("\n");
    let model = create_test_model(&text);
    let model = update(model, Message::MoveToEnd);
    let rows = model.editor_rows();
    assert_eq!(model.editor_scroll_offset, 100 - rows);

    let model = update(model, Message::MoveToStart);
    assert_eq!(model.editor_scroll_offset, 0);
}

#[test]
fn test_page_down_moves_cursor_by_visible_rows() {
    let text = (0..100).map(|i| format!("{i}")).collect::<Vec<_>>().join("\n");
    let model = update(create_test_model(&text), Message::PageDown);
    assert_eq!(model.buffer.cursor().line, model.editor_rows());
}

#[test]
fn test_resize_updates_dimensions() {
    let model = update(create_test_model(""), Message::Resize(120, 40));
    assert_eq!((model.width, model.height), (120, 40));
}

#[test]
fn test_key_bindings() {
    let model = create_test_model("");
    assert_eq!(handle_key(ctrl('s'), &model), Some(Message::Save));
    assert_eq!(handle_key(ctrl('e'), &model), Some(Message::Export));
    assert_eq!(handle_key(ctrl('p'), &model), Some(Message::ToggleStatus));
    assert_eq!(handle_key(ctrl('t'), &model), Some(Message::CycleView));
    assert_eq!(handle_key(ctrl('q'), &model), Some(Message::Quit));
    assert_eq!(handle_key(key(KeyCode::Char('q')), &model), Some(Message::InsertChar('q')));
    assert_eq!(handle_key(key(KeyCode::Enter), &model), Some(Message::SplitLine));
    assert_eq!(handle_key(key(KeyCode::F(1)), &model), Some(Message::ToggleHelp));
    assert_eq!(
        handle_key(KeyEvent::new(KeyCode::Down, KeyModifiers::ALT), &model),
        Some(Message::PreviewScrollDown(1))
    );
}

#[test]
fn test_help_overlay_swallows_typing() {
    let model = update(create_test_model(""), Message::ToggleHelp);
    assert!(model.help_visible);
    assert_eq!(handle_key(key(KeyCode::Char('x')), &model), None);
    assert_eq!(handle_key(key(KeyCode::Esc), &model), Some(Message::HideHelp));
}

#[test]
fn test_paste_and_resize_events() {
    let model = create_test_model("");
    assert_eq!(
        handle_event(&Event::Paste("a\r\nb".to_string()), &model),
        Some(Message::InsertText("a\nb".to_string()))
    );
    assert_eq!(
        handle_event(&Event::Resize(100, 30), &model),
        Some(Message::Resize(100, 30))
    );
}

#[test]
fn test_mouse_wheel_over_preview_scrolls_preview() {
    let model = create_test_model("");
    let wheel = |column| {
        Event::Mouse(MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column,
            row: 5,
            modifiers: KeyModifiers::NONE,
        })
    };
    assert_eq!(
        handle_event(&wheel(70), &model),
        Some(Message::PreviewScrollDown(3))
    );
    assert_eq!(
        handle_event(&wheel(5), &model),
        Some(Message::MoveCursor(Direction::Down))
    );
}
