use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use super::app::{App, AppMode, ComposeField, SettingsField, TextInput};
use crate::studio::View;

/// Handle input while browsing the studio views
pub async fn handle_studio_input(app: &mut App, key: KeyEvent) -> Result<()> {
    // Keys shared by every view
    match key.code {
        KeyCode::Char(c @ '1'..='3') => {
            let view = match c {
                '1' => View::Compose,
                '2' => View::Preview,
                _ => View::History,
            };
            app.studio.set_view(view);
            return Ok(());
        }
        KeyCode::Tab => {
            let next = match app.studio.view() {
                View::Compose => View::Preview,
                View::Preview => View::History,
                View::History => View::Compose,
            };
            app.studio.set_view(next);
            return Ok(());
        }
        KeyCode::Char('e') => {
            app.clear_messages();
            return Ok(());
        }
        KeyCode::Char('s') => {
            app.mode = AppMode::Settings;
            app.settings_selected = 0;
            app.settings_editing = false;
            return Ok(());
        }
        KeyCode::Char('g') | KeyCode::F(5) => {
            app.start_generation();
            return Ok(());
        }
        KeyCode::Char('q') => {
            app.should_quit = true;
            return Ok(());
        }
        KeyCode::Esc if app.studio.error().is_some() => {
            app.clear_messages();
            return Ok(());
        }
        _ => {}
    }

    match app.studio.view() {
        View::Compose => handle_compose_input(app, key),
        View::Preview => handle_preview_input(app, key).await,
        View::History => handle_history_input(app, key),
    }
    Ok(())
}

fn handle_compose_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Left | KeyCode::Char('h') => app.adjust_selected(false),
        KeyCode::Right | KeyCode::Char('l') => app.adjust_selected(true),

        KeyCode::Enter => match app.selected_compose_field() {
            ComposeField::Prompt => {
                app.input = TextInput::with_text(&app.studio.settings().prompt);
                app.mode = AppMode::EditPrompt;
            }
            ComposeField::SourceImage => {
                app.input = TextInput::default();
                app.mode = AppMode::EditImagePath;
            }
            _ => app.adjust_selected(true),
        },

        // Shortcuts for the text rows
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.input = TextInput::with_text(&app.studio.settings().prompt);
            app.mode = AppMode::EditPrompt;
        }
        KeyCode::Char('u') => {
            app.input = TextInput::default();
            app.mode = AppMode::EditImagePath;
        }
        KeyCode::Char('x') => {
            if app.studio.settings().source_image.is_some() {
                app.studio.clear_source_image();
                app.set_status("Source image removed");
            }
        }

        _ => {}
    }
}

async fn handle_preview_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('d') => app.download_current().await,
        KeyCode::Char('c') | KeyCode::Backspace | KeyCode::Esc => {
            app.studio.set_view(View::Compose)
        }
        _ => {}
    }
}

fn handle_history_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_previous(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Home => app.history_selected = 0,
        KeyCode::End => app.history_selected = app.studio.history().len().saturating_sub(1),

        KeyCode::Enter => {
            if app.studio.select_history(app.history_selected) {
                app.set_status("Restored settings from archive");
            }
        }

        KeyCode::Char('w') => {
            if !app.studio.history().is_empty() {
                app.studio.clear_history();
                app.history_selected = 0;
                app.set_status("Archive cleared");
            }
        }

        _ => {}
    }
}

/// Handle input while editing the prompt or the image path
pub async fn handle_edit_input(app: &mut App, key: KeyEvent) -> Result<()> {
    match key.code {
        KeyCode::Esc => {
            app.input.take();
            app.mode = AppMode::Studio;
        }

        KeyCode::Enter => {
            let text = app.input.take();
            let mode = app.mode;
            app.mode = AppMode::Studio;
            match mode {
                AppMode::EditPrompt => app.studio.set_prompt(text),
                AppMode::EditImagePath if !text.trim().is_empty() => {
                    app.load_source_image(&text).await
                }
                _ => {}
            }
        }

        KeyCode::Char(c) => app.input.insert(c),
        KeyCode::Backspace => app.input.backspace(),
        KeyCode::Delete => app.input.delete(),
        KeyCode::Left => app.input.left(),
        KeyCode::Right => app.input.right(),
        KeyCode::Home => app.input.home(),
        KeyCode::End => app.input.end(),

        _ => {}
    }
    Ok(())
}

/// Handle input in settings mode
pub fn handle_settings_input(app: &mut App, key: KeyEvent) -> Result<()> {
    let fields = SettingsField::all();

    if app.settings_editing {
        // Editing a text field
        match key.code {
            KeyCode::Esc => {
                app.settings_editing = false;
                app.settings_edit_buffer.clear();
            }

            KeyCode::Enter => {
                let field = fields[app.settings_selected];
                let value = app.settings_edit_buffer.clone();
                if field.is_secret() && value.trim().is_empty() {
                    // Blank input keeps the stored key
                    app.set_status(format!("{} unchanged", field.label()));
                } else if let Err(e) = app.set_settings_value(&field, &value) {
                    app.set_error(e.to_string());
                } else {
                    app.set_status(format!("Updated {}", field.label()));
                }
                app.settings_editing = false;
                app.settings_edit_buffer.clear();
            }

            KeyCode::Char(c) => {
                app.settings_edit_buffer.push(c);
            }

            KeyCode::Backspace => {
                app.settings_edit_buffer.pop();
            }

            _ => {}
        }
    } else {
        // Navigation
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                if app.settings_selected > 0 {
                    app.settings_selected -= 1;
                }
            }

            KeyCode::Down | KeyCode::Char('j') => {
                if app.settings_selected < fields.len() - 1 {
                    app.settings_selected += 1;
                }
            }

            KeyCode::Enter | KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => {
                let field = &fields[app.settings_selected];

                // Check if this field has options to cycle
                if app.get_settings_options(field).is_some() {
                    app.cycle_settings_option(field)?;
                    app.set_status(format!("Updated {}", field.label()));
                } else if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    // Keys are never shown, so editing starts blank
                    app.settings_editing = true;
                    app.settings_edit_buffer = if field.is_secret() {
                        String::new()
                    } else {
                        app.get_settings_value(field)
                    };
                }
            }

            KeyCode::Esc | KeyCode::Char('q') => {
                app.mode = AppMode::Studio;
                app.clear_messages();
            }

            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn prompt_editing_round_trip() {
        let mut app = App::new(Config::default());

        handle_studio_input(&mut app, press(KeyCode::Char('i'))).await.unwrap();
        assert_eq!(app.mode, AppMode::EditPrompt);

        for c in "A tea stall".chars() {
            handle_edit_input(&mut app, press(KeyCode::Char(c))).await.unwrap();
        }
        handle_edit_input(&mut app, press(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.mode, AppMode::Studio);
        assert_eq!(app.studio.settings().prompt, "A tea stall");
    }

    #[tokio::test]
    async fn number_keys_switch_views() {
        let mut app = App::new(Config::default());

        handle_studio_input(&mut app, press(KeyCode::Char('3'))).await.unwrap();
        assert_eq!(app.studio.view(), View::History);

        handle_studio_input(&mut app, press(KeyCode::Tab)).await.unwrap();
        assert_eq!(app.studio.view(), View::Compose);
    }

    #[tokio::test]
    async fn error_is_dismissed_with_escape() {
        let mut app = App::new(Config::default());
        handle_studio_input(&mut app, press(KeyCode::Char('g'))).await.unwrap();
        assert!(app.studio.error().is_some());

        handle_studio_input(&mut app, press(KeyCode::Esc)).await.unwrap();
        assert!(app.studio.error().is_none());
    }

    #[test]
    fn secret_fields_start_blank() {
        let mut app = App::new(Config::default());
        app.config.api.key = Some("secret".into());
        app.mode = AppMode::Settings;

        handle_settings_input(&mut app, press(KeyCode::Enter)).unwrap();

        assert!(app.settings_editing);
        assert!(app.settings_edit_buffer.is_empty());
    }

    #[test]
    fn blank_secret_submission_keeps_the_key() {
        let mut app = App::new(Config::default());
        app.config.api.key = Some("secret".into());
        app.mode = AppMode::Settings;

        handle_settings_input(&mut app, press(KeyCode::Enter)).unwrap();
        handle_settings_input(&mut app, press(KeyCode::Enter)).unwrap();

        assert!(!app.settings_editing);
        assert_eq!(app.config.api.key.as_deref(), Some("secret"));
        assert!(!app.config_changed);
    }

    #[test]
    fn typed_secret_replaces_the_key() {
        let mut app = App::new(Config::default());
        app.config.api.key = Some("secret".into());
        app.mode = AppMode::Settings;

        handle_settings_input(&mut app, press(KeyCode::Enter)).unwrap();
        for c in "fresh".chars() {
            handle_settings_input(&mut app, press(KeyCode::Char(c))).unwrap();
        }
        handle_settings_input(&mut app, press(KeyCode::Enter)).unwrap();

        assert_eq!(app.config.api.key.as_deref(), Some("fresh"));
        assert!(app.config_changed);
    }
}
