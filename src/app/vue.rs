// src/app/vue.rs
//
// Vue (UI egui) : natif + web
// ---------------------------
// Objectifs :
// - Même AppCalc (etat.rs) pour natif + wasm
// - Clavier : Enter exécute la ligne (quand le champ est focus)
// - Tactile : gros boutons, focus redonné après clic (focus_entree)
// - Pavé de chiffres adapté à $input_base (jusqu’à 42 symboles)
//
// Note :
// - PAS de Key::NumEnter (n’existe pas dans egui 0.33.x)

use eframe::egui;

use super::etat::{AppCalc, Ligne};

/// Colonnes du pavé de chiffres.
const COLONNES_PAVE: usize = 7;

impl AppCalc {
    /// UI principale : à appeler depuis eframe::App::update(...)
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        // Densité “calc”
        ui.spacing_mut().item_spacing = egui::vec2(6.0, 6.0);

        ui.heading("Calculatrice Q-base");
        ui.add_space(6.0);

        self.ui_entree(ui);

        ui.add_space(8.0);
        ui.separator();

        self.ui_historique(ui);

        ui.separator();
        self.ui_demarche(ui);
    }

    fn ui_entree(&mut self, ui: &mut egui::Ui) {
        ui.label("Entrée :");

        // IMPORTANT : id stable + focus contrôlé
        let resp = ui.add(
            egui::TextEdit::singleline(&mut self.entree)
                .desired_width(ui.available_width())
                .hint_text("Ex: 5^-2, root(8, 3), x := 1/3, $output_base := 16, #usage")
                .id_source("entree_edit")
                .code_editor(),
        );

        if self.focus_entree {
            resp.request_focus();
            self.focus_entree = false;
        }

        // --- Clavier : Enter exécute (seulement si le champ est focus) ---
        let enter = ui.input(|i| i.key_pressed(egui::Key::Enter));
        if resp.has_focus() && enter {
            self.executer();
        }

        ui.add_space(6.0);

        // Commandes
        ui.horizontal_wrapped(|ui| {
            self.bouton_action(ui, "C", "Efface seulement l’entrée", Action::ClearEntree);
            self.bouton_action(ui, "DEL", "Efface le dernier symbole", Action::Backspace);

            ui.separator();

            for (cmd, tip) in [
                ("#clear", "Efface l’historique"),
                ("#list", "Liste les constantes en usage"),
                ("#reset", "Environnement par défaut"),
                ("#usage", "Mode d’emploi"),
            ] {
                self.bouton_action(ui, cmd, tip, Action::Commande(cmd));
            }
        });

        ui.add_space(6.0);

        // Opérateurs + fonctions + "="
        ui.horizontal_wrapped(|ui| {
            self.bouton_insert(ui, "(", "(", InsertKind::OpenParen);
            self.bouton_insert(ui, ")", ")", InsertKind::CloseParen);

            for op in ["+", "-", "*", "/", "^"] {
                self.bouton_insert(ui, op, op, InsertKind::Op);
            }
            self.bouton_insert(ui, ",", ", ", InsertKind::Digit);
            self.bouton_insert(ui, ":=", ":=", InsertKind::Op);

            ui.separator();

            self.bouton_insert(ui, "pi", "pi", InsertKind::Word);
            self.bouton_insert(ui, "e", "e", InsertKind::Word);
            self.bouton_insert(ui, "sqrt", "sqrt(", InsertKind::Func);
            self.bouton_insert(ui, "root", "root(", InsertKind::Func);

            ui.add_space(10.0);

            let eq = ui.add_sized([64.0, 32.0], egui::Button::new("="));
            if eq.clicked() {
                self.executer();
            }
        });

        ui.add_space(6.0);

        self.ui_pave_chiffres(ui);

        if !self.erreur.is_empty() {
            ui.add_space(6.0);
            ui.colored_label(ui.visuals().error_fg_color, &self.erreur);
        }
    }

    /// Pavé : les chiffres de la base d’entrée courante, puis le séparateur.
    fn ui_pave_chiffres(&mut self, ui: &mut egui::Ui) {
        let mut touches: Vec<String> = self.chiffres_entree().iter().map(|c| c.to_string()).collect();
        touches.push(".".to_string());

        egui::Grid::new("pave_chiffres_qbase")
            .num_columns(COLONNES_PAVE)
            .spacing([6.0, 6.0])
            .show(ui, |ui| {
                for (i, t) in touches.iter().enumerate() {
                    self.bouton_insert(ui, t, t, InsertKind::Digit);
                    if (i + 1) % COLONNES_PAVE == 0 {
                        ui.end_row();
                    }
                }
            });
    }

    fn ui_historique(&mut self, ui: &mut egui::Ui) {
        let hauteur = (ui.available_height() * 0.6).max(120.0);
        egui::ScrollArea::vertical()
            .id_salt("historique")
            .max_height(hauteur)
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for l in &self.historique {
                    match l {
                        Ligne::Entree(s) => {
                            ui.monospace(format!("> {s}"));
                        }
                        Ligne::Sortie(s) => {
                            ui.monospace(s);
                        }
                        Ligne::Avertissement(s) => {
                            ui.colored_label(ui.visuals().warn_fg_color, s);
                        }
                        Ligne::Erreur(s) => {
                            ui.colored_label(ui.visuals().error_fg_color, s);
                        }
                    }
                }
            });
    }

    fn ui_demarche(&mut self, ui: &mut egui::Ui) {
        egui::CollapsingHeader::new("Démarche")
            .default_open(false)
            .show(ui, |ui| {
                Self::champ_demarche(ui, "Jetons", "demarche_jetons", &self.demarche.jetons);
                Self::champ_demarche(ui, "RPN", "demarche_rpn", &self.demarche.rpn);
                Self::champ_demarche(ui, "Arbre", "demarche_arbre", &self.demarche.arbre);
                Self::champ_demarche(
                    ui,
                    "Incidents",
                    "demarche_incidents",
                    &self.incidents.join("\n"),
                );
            });
    }

    fn champ_demarche(ui: &mut egui::Ui, titre: &str, id: &str, contenu: &str) {
        ui.add_space(4.0);
        ui.label(format!("{titre} :"));
        Self::champ_monospace(ui, id, contenu, 1);
    }

    fn champ_monospace(ui: &mut egui::Ui, id: &str, contenu: &str, rows: usize) {
        // Affichage lecture seule “stable”, sans TextEdit interactif.
        egui::Frame::group(ui.style())
            .fill(ui.visuals().extreme_bg_color)
            .show(ui, |ui| {
                ui.push_id(id, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.set_min_height(
                        rows as f32 * ui.text_style_height(&egui::TextStyle::Monospace),
                    );
                    ui.monospace(contenu);
                });
            });
    }

    /// Backspace “intelligent” : retire d’un coup "sqrt(", "root(", ":=".
    fn backspace_entree(&mut self) {
        while self.entree.ends_with(' ') {
            self.entree.pop();
        }

        for pat in ["sqrt(", "root(", ":="] {
            if self.entree.ends_with(pat) {
                for _ in 0..pat.chars().count() {
                    self.entree.pop();
                }
                return;
            }
        }

        self.entree.pop();
    }

    fn bouton_action(&mut self, ui: &mut egui::Ui, label: &str, tip: &str, action: Action) {
        let resp = ui
            .add_sized([56.0, 30.0], egui::Button::new(label))
            .on_hover_text(tip);

        if resp.clicked() {
            match action {
                Action::ClearEntree => self.clear_entree(),
                Action::Backspace => self.backspace_entree(),
                Action::Commande(cmd) => self.executer_ligne(cmd),
            }
            self.focus_entree = true;
        }
    }

    fn bouton_insert(&mut self, ui: &mut egui::Ui, label: &str, to_insert: &str, kind: InsertKind) {
        let resp = ui.add_sized([40.0, 28.0], egui::Button::new(label));
        if !resp.clicked() || to_insert.is_empty() {
            return;
        }

        match kind {
            InsertKind::CloseParen => {
                while self.entree.ends_with(' ') {
                    self.entree.pop();
                }
                self.entree.push_str(to_insert);
            }
            InsertKind::OpenParen | InsertKind::Func => {
                let last = self.entree.chars().rev().find(|c| !c.is_whitespace());
                if let Some(c) = last {
                    if c.is_alphanumeric() || c == ')' {
                        self.entree.push(' ');
                    }
                }
                self.entree.push_str(to_insert);
            }
            InsertKind::Op => {
                while self.entree.ends_with(' ') {
                    self.entree.pop();
                }
                if !self.entree.is_empty() {
                    self.entree.push(' ');
                }
                self.entree.push_str(to_insert);
                self.entree.push(' ');
            }
            InsertKind::Digit => {
                // chiffres: pas d’espaces auto
                self.entree.push_str(to_insert);
            }
            InsertKind::Word => {
                // mots: espace si juste avant c’est un chiffre ou ')'
                if !self.entree.ends_with(char::is_whitespace) {
                    let last = self.entree.chars().next_back();
                    if let Some(c) = last {
                        if c.is_alphanumeric() || c == ')' {
                            self.entree.push(' ');
                        }
                    }
                }
                self.entree.push_str(to_insert);
            }
        }

        self.focus_entree = true;
    }
}

#[derive(Clone, Copy, Debug)]
enum Action {
    ClearEntree,
    Backspace,
    Commande(&'static str),
}

#[derive(Clone, Copy, Debug)]
enum InsertKind {
    Digit,
    Word,
    Func,
    Op,
    OpenParen,
    CloseParen,
}
