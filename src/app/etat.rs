//! src/app/etat.rs
//!
//! État UI (sans vue).
//!
//! Rôle : contenir l’état de la calculatrice (entrée, historique, erreur,
//! portée, démarche) et exécuter une ligne : commande `#…` ou expression.
//!
//! Contrats :
//! - Aucun type egui ici : tout est testable sans fenêtre.
//! - La portée (constantes + réglages) vit ici, et seulement ici.
//! - Défense en profondeur : historique borné.

use log::info;

use calculatrice_qbase::noyau::base_n::format;
use calculatrice_qbase::noyau::eval::{Demarche, Evaluation};
use calculatrice_qbase::noyau::{eval_expression, Erreur, Portee};

/// Garde-fou : nombre maximal de lignes conservées dans l’historique.
const HISTORIQUE_MAX: usize = 500;

/// Message d’accueil (première ligne de l’historique).
const ACCUEIL: &str = "Tapez #usage pour les instructions";

const USAGE: [&str; 6] = [
    "#clear : efface l’historique",
    "#list  : liste les constantes en usage",
    "#reset : remet l’environnement de travail par défaut",
    "$precision, $input_base et $output_base règlent le calcul et la lecture",
    "$frac non nul : résultats en fraction n/d",
    "nom := expression : définit une constante (toujours lue en base 10)",
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Ligne {
    /// Écho de la ligne tapée.
    Entree(String),
    Sortie(String),
    /// Incident récupéré pendant l’évaluation.
    Avertissement(String),
    Erreur(String),
}

#[derive(Clone, Debug)]
pub struct AppCalc {
    // --- entrée utilisateur ---
    pub entree: String,

    // --- sorties ---
    pub historique: Vec<Ligne>,
    pub erreur: String, // message d’erreur de la dernière ligne (si échec)

    // --- démarche (panneau d’explication) ---
    pub demarche: Demarche,
    pub incidents: Vec<String>,

    // --- environnement de travail ---
    pub portee: Portee,

    // --- UX ---
    // Permet à vue.rs de redonner le focus à l’entrée après un clic sur un bouton.
    pub focus_entree: bool,
}

impl Default for AppCalc {
    fn default() -> Self {
        Self {
            entree: String::new(),
            historique: vec![Ligne::Sortie(ACCUEIL.to_string())],
            erreur: String::new(),
            demarche: Demarche::default(),
            incidents: Vec::new(),
            portee: Portee::par_defaut(),
            focus_entree: true, // au lancement, on veut pouvoir taper tout de suite
        }
    }
}

impl AppCalc {
    /* ------------------------ Actions “boutons” (état seulement) ------------------------ */

    /// C : effacer seulement l’entrée.
    pub fn clear_entree(&mut self) {
        self.entree.clear();
        self.focus_entree = true;
    }

    /// #clear : effacer l’historique (la portée est conservée).
    pub fn clear_historique(&mut self) {
        self.historique.clear();
        self.erreur.clear();
        self.demarche = Demarche::default();
        self.incidents.clear();
        self.focus_entree = true;
    }

    /// #list : une ligne `nom: valeur` par liaison, écrite comme un résultat
    /// ($output_base, $precision, $frac).
    pub fn lister(&mut self) {
        match self.lignes_de_liste() {
            Ok(lignes) => {
                for l in lignes {
                    self.pousser(Ligne::Sortie(l));
                }
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
    }

    fn lignes_de_liste(&self) -> Result<Vec<String>, Erreur> {
        let r = self.portee.reglages()?;
        self.portee
            .iter()
            .map(|(nom, v)| {
                let texte = format(v, &r.output_base, r.precision, r.frac)?;
                Ok(format!("{nom}: {texte}"))
            })
            .collect()
    }

    /// #reset : portée par défaut, historique vidé, puis liste.
    pub fn reinitialiser(&mut self) {
        self.portee = Portee::par_defaut();
        self.clear_historique();
        self.lister();
    }

    pub fn usage(&mut self) {
        for l in USAGE {
            self.pousser(Ligne::Sortie(l.to_string()));
        }
    }

    /// Exécute l’entrée courante, puis la vide.
    pub fn executer(&mut self) {
        let ligne = std::mem::take(&mut self.entree);
        self.executer_ligne(&ligne);
        self.focus_entree = true;
    }

    /// Exécute une ligne (insensible à la casse, comme la saisie console).
    pub fn executer_ligne(&mut self, ligne: &str) {
        let ligne = ligne.trim().to_lowercase();
        if ligne.is_empty() {
            return;
        }

        self.erreur.clear();
        self.pousser(Ligne::Entree(ligne.clone()));

        if ligne.starts_with('#') {
            info!("commande {ligne}");
            match ligne.as_str() {
                "#clear" => self.clear_historique(),
                "#list" => self.lister(),
                "#reset" => self.reinitialiser(),
                "#usage" => self.usage(),
                autre => self.set_erreur(format!("commande inconnue : {autre}")),
            }
            return;
        }

        match self.evaluer(&ligne) {
            Ok((sortie, ev)) => {
                self.pousser(Ligne::Sortie(sortie));
                self.incidents = ev.incidents.iter().map(|e| e.to_string()).collect();
                for i in self.incidents.clone() {
                    self.pousser(Ligne::Avertissement(i));
                }
                self.demarche = ev.demarche;
            }
            Err(e) => self.set_erreur(e.to_string()),
        }
    }

    /// Évalue avec $input_base, formate avec $output_base / $precision / $frac.
    fn evaluer(&mut self, ligne: &str) -> Result<(String, Evaluation), Erreur> {
        let base = self.portee.reglages()?.input_base;
        let ev = eval_expression(ligne, &base, &mut self.portee)?;

        // réglages relus : la ligne a pu les modifier ($output_base := 16)
        let r = self.portee.reglages()?;
        let sortie = format(&ev.valeur, &r.output_base, r.precision, r.frac)?;
        Ok((sortie, ev))
    }

    /// Utilitaire : placer une erreur (ligne d’historique + bandeau).
    ///
    /// La démarche précédente est effacée (non fiable si l’évaluation échoue).
    pub fn set_erreur(&mut self, msg: impl Into<String>) {
        self.erreur = msg.into();
        self.demarche = Demarche::default();
        self.incidents.clear();
        self.pousser(Ligne::Erreur(self.erreur.clone()));
        self.focus_entree = true;
    }

    fn pousser(&mut self, l: Ligne) {
        self.historique.push(l);
        if self.historique.len() > HISTORIQUE_MAX {
            let trop = self.historique.len() - HISTORIQUE_MAX;
            self.historique.drain(..trop);
        }
    }

    /// Symboles de chiffres valides dans la base d’entrée courante (pavé).
    pub fn chiffres_entree(&self) -> Vec<char> {
        let n = self
            .portee
            .reglages()
            .map(|r| r.input_base.chiffres())
            .unwrap_or(10);
        calculatrice_qbase::noyau::base_n::ALPHABET
            .chars()
            .take(n)
            .collect()
    }
}
