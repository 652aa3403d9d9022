//! Calculatrice Q-base : noyau exact (rationnels) en base N.
//!
//! Le binaire (src/main.rs) n’est qu’une façade egui autour de `noyau`.

pub mod noyau;
