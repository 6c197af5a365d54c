//! Desktop shell: chat log, input area, and the backend event pump.

use conversation::{prompts, Affordance, UserEvent};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use shared::domain::Message;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::controller::reducer::ChatView;
use crate::ui::preview::PreviewCache;

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif"];
const USER_BUBBLE: egui::Color32 = egui::Color32::from_rgb(46, 125, 50);
const BOT_BUBBLE: egui::Color32 = egui::Color32::from_rgb(55, 60, 66);

pub struct LeafChatApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    view: ChatView,
    composer: String,
    previews: PreviewCache,
    api_base_url: String,
}

impl LeafChatApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        api_base_url: String,
    ) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            view: ChatView::default(),
            composer: String::new(),
            previews: PreviewCache::default(),
            api_base_url,
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.view.apply(event);
        }
    }

    fn submit(&mut self, event: UserEvent) {
        if !self.view.begin_submit() {
            return;
        }
        if !dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Conversation(event),
            &mut self.view.status,
        ) {
            self.view.abort_submit();
        }
    }

    fn restart(&mut self) {
        if !self.view.can_restart() {
            return;
        }
        self.composer.clear();
        self.submit(UserEvent::Restart);
    }

    fn pick_image(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Gambar", IMAGE_EXTENSIONS)
            .pick_file()
        {
            self.submit(UserEvent::ImageSelected { path });
        }
    }

    fn send_question(&mut self) {
        let question = self.composer.trim().to_string();
        if question.is_empty() {
            return;
        }
        self.composer.clear();
        self.submit(UserEvent::QuestionSubmitted(question));
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                ui.heading("LeafChat");
                ui.weak(&self.api_base_url);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui
                        .add_enabled(self.view.can_restart(), egui::Button::new("Gambar baru"))
                        .on_hover_text("Mulai diagnosis baru")
                        .clicked()
                    {
                        self.restart();
                    }
                });
            });
            ui.add_space(6.0);
        });
    }

    fn show_input_area(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("input_area").show(ctx, |ui| {
            ui.add_space(8.0);
            let enabled = self.view.input_enabled;

            match self.view.affordance.clone() {
                Some(Affordance::Upload) => {
                    let label = if enabled {
                        prompts::UPLOAD_BUTTON
                    } else {
                        prompts::BUSY_HINT
                    };
                    let width = ui.available_width();
                    if ui
                        .add_enabled(
                            enabled,
                            egui::Button::new(label).min_size(egui::vec2(width, 36.0)),
                        )
                        .clicked()
                    {
                        self.pick_image();
                    }
                }
                Some(Affordance::Text) => {
                    ui.horizontal(|ui| {
                        let hint = if enabled {
                            prompts::QUESTION_HINT
                        } else {
                            prompts::BUSY_HINT
                        };
                        let field_width = ui.available_width() - 80.0;
                        let response = ui.add_enabled(
                            enabled,
                            egui::TextEdit::singleline(&mut self.composer)
                                .hint_text(hint)
                                .desired_width(field_width),
                        );
                        let enter_pressed = response.lost_focus()
                            && ui.input(|i| i.key_pressed(egui::Key::Enter));
                        let clicked_send = ui
                            .add_enabled(
                                enabled && !self.composer.trim().is_empty(),
                                egui::Button::new("Kirim"),
                            )
                            .clicked();
                        if enter_pressed || clicked_send {
                            self.send_question();
                            response.request_focus();
                        }
                    });
                }
                Some(Affordance::Options(options)) => {
                    ui.horizontal_wrapped(|ui| {
                        for option in &options {
                            if ui
                                .add_enabled(enabled, egui::Button::new(&option.title))
                                .clicked()
                            {
                                self.submit(UserEvent::OptionChosen {
                                    action: option.action.clone(),
                                });
                            }
                        }
                    });
                }
                None => {
                    ui.horizontal(|ui| {
                        ui.spinner();
                        ui.label("Menyiapkan percakapan...");
                    });
                }
            }

            if !self.view.status.is_empty() {
                ui.add_space(4.0);
                ui.colored_label(ui.visuals().warn_fg_color, &self.view.status);
            }
            ui.add_space(8.0);
        });
    }

    fn show_log(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .stick_to_bottom(true)
                .show(ui, |ui| {
                    let entries: Vec<(Message, bool)> = self
                        .view
                        .transcript
                        .messages()
                        .enumerate()
                        .map(|(index, message)| {
                            (message.clone(), self.view.transcript.is_transient(index))
                        })
                        .collect();
                    for (message, transient) in &entries {
                        self.show_message(ui, message, *transient);
                        ui.add_space(6.0);
                    }
                });
        });
    }

    fn show_message(&mut self, ui: &mut egui::Ui, message: &Message, transient: bool) {
        let from_user = message.is_from_user();
        let layout = if from_user {
            egui::Layout::right_to_left(egui::Align::TOP)
        } else {
            egui::Layout::left_to_right(egui::Align::TOP)
        };
        let max_width = (ui.available_width() * 0.75).max(200.0);

        ui.with_layout(layout, |ui| {
            egui::Frame::new()
                .fill(if from_user { USER_BUBBLE } else { BOT_BUBBLE })
                .corner_radius(egui::CornerRadius::same(10))
                .inner_margin(egui::Margin::symmetric(12, 8))
                .show(ui, |ui| {
                    ui.set_max_width(max_width);
                    ui.vertical(|ui| {
                        if let Some(path) = &message.image {
                            match self.previews.thumbnail(ui.ctx(), path) {
                                Some(texture) => {
                                    let size = texture.size_vec2();
                                    ui.add(egui::Image::new(&texture).fit_to_exact_size(size));
                                }
                                None => {
                                    ui.small(format!("Tidak dapat menampilkan {}", path.display()));
                                }
                            }
                        }
                        let text = egui::RichText::new(&message.text).color(egui::Color32::WHITE);
                        if transient {
                            ui.label(text.italics());
                        } else {
                            ui.label(text);
                        }
                        ui.label(
                            egui::RichText::new(
                                message
                                    .sent_at
                                    .with_timezone(&chrono::Local)
                                    .format("%H:%M")
                                    .to_string(),
                            )
                            .small()
                            .color(egui::Color32::from_gray(190)),
                        );
                    });
                });
        });
    }
}

impl eframe::App for LeafChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_header(ctx);
        self.show_input_area(ctx);
        self.show_log(ctx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }
}
