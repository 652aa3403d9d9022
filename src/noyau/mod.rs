//! Noyau exact Q-base
//!
//! Organisation interne :
//! - erreur.rs     : erreurs typées (fatales / récupérables)
//! - constantes.rs : e, pi en rationnels (séries, Machin)
//! - portee.rs     : liaisons nom -> valeur + réglages ($precision, bases…)
//! - base_n.rs     : codec base N (2..42, base rationnelle permise)
//! - jetons.rs     : tokenisation
//! - rpn.rs        : shunting-yard + construction Expr
//! - expr.rs       : AST
//! - racines.rs    : bissection, Brent, Newton, racine n-ième
//! - eval.rs       : pipeline complet

pub mod base_n;
pub mod constantes;
pub mod erreur;
pub mod eval;
pub mod expr;
pub mod jetons;
pub mod portee;
pub mod racines;
pub mod rpn;

#[cfg(test)]
mod tests_scientifiques;


#[cfg(test)]
mod proptests;

// API publique minimale
pub use erreur::Erreur;
pub use eval::{eval_expression, Evaluation};
pub use portee::Portee;
