// src/noyau/erreur.rs
//
// Erreurs du noyau (une seule énumération).
//
// Deux familles :
// - fatales : l’appel échoue (Err),
// - récupérées (“incidents”) : l’évaluation continue, la faute est listée dans
//   Evaluation::incidents et journalisée (log::warn!).
//
// La politique (fatale ou récupérée) est décidée par l’appelant, pas ici.

use num_rational::BigRational;
use thiserror::Error;

#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum Erreur {
    /* ------------------------ Recherche de racines ------------------------ */
    #[error("tolérance invalide : {0} (doit être > 0)")]
    ToleranceInvalide(BigRational),

    #[error(
        "crochet invalide : f doit être au-dessus de la cible d’un côté et en dessous de l’autre. \
         Cible : {cible}. f(gauche) = {f_gauche}. f(droite) = {f_droite}"
    )]
    CrochetInvalide {
        cible: BigRational,
        f_gauche: BigRational,
        f_droite: BigRational,
    },

    #[error("racine invalide : {0}")]
    RacineInvalide(String),

    /* ------------------------ Évaluation ------------------------ */
    #[error("division par zéro")]
    DivisionParZero,

    #[error("chiffre inconnu '{chiffre}' en base {base}")]
    ChiffreInconnu { chiffre: char, base: String },

    #[error("parenthèse fermante manquante (ajoutée en fin d’expression)")]
    ParentheseManquante,

    #[error("expression invalide : {0}")]
    ExpressionInvalide(String),

    #[error("caractère inattendu: '{0}'")]
    CaractereInattendu(char),

    #[error("fonction inconnue : {0}")]
    FonctionInconnue(String),

    #[error("{fonction} attend {attendus} argument(s), reçu {recus}")]
    Arite {
        fonction: String,
        attendus: usize,
        recus: usize,
    },

    #[error("nom invalide pour une affectation : {0:?}")]
    NomInvalide(String),

    #[error("exposant trop grand : {0}")]
    ExposantTropGrand(String),

    #[error("nombre trop long pour être écrit en base {base} ({bits} bits)")]
    NombreTropLong { bits: u64, base: String },

    /* ------------------------ Configuration ------------------------ */
    #[error("base invalide : {0} (attendu 2 ≤ base ≤ 42)")]
    BaseInvalide(BigRational),

    #[error("réglage invalide {nom} = {valeur} : {raison}")]
    ReglageInvalide {
        nom: String,
        valeur: BigRational,
        raison: String,
    },
}

impl Erreur {
    /// Faute que l’évaluateur sait absorber (zéro ou `)` implicite).
    pub fn est_recuperable(&self) -> bool {
        matches!(
            self,
            Erreur::DivisionParZero | Erreur::ChiffreInconnu { .. } | Erreur::ParentheseManquante
        )
    }
}
