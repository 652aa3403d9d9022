// src/noyau/portee.rs
//
// Portée de liaisons : nom -> rationnel.
//
// - Constantes utilisateur (x := 7) + constantes par défaut (e, pi).
// - Réglages réservés ($precision, $input_base, $output_base, $frac, $epsilon).
//
// IMPORTANT : Portee n’est pas synchronisée. Un appelant qui la partage entre
// threads doit sérialiser les accès (Mutex<Portee>).

use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use super::base_n::Base;
use super::constantes::{self, DIGITS_CONSTANTES};
use super::erreur::Erreur;

pub const PRECISION: &str = "$precision";
pub const INPUT_BASE: &str = "$input_base";
pub const OUTPUT_BASE: &str = "$output_base";
pub const FRAC: &str = "$frac";
pub const EPSILON: &str = "$epsilon";

/// Garde-fou : on borne la précision (anti-gel du formatage).
pub const PRECISION_MAX: usize = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Portee {
    liaisons: BTreeMap<String, BigRational>,
}

impl Default for Portee {
    fn default() -> Self {
        Self::par_defaut()
    }
}

impl Portee {
    /// Portée sans aucune liaison (pas même les réglages).
    pub fn vide() -> Self {
        Self {
            liaisons: BTreeMap::new(),
        }
    }

    /// Environnement de travail initial : e, pi + réglages par défaut.
    pub fn par_defaut() -> Self {
        let mut p = Self::vide();
        p.definir("e", constantes::e(DIGITS_CONSTANTES));
        p.definir("pi", constantes::pi(DIGITS_CONSTANTES));
        p.definir(FRAC, entier(0));
        p.definir(PRECISION, entier(30));
        p.definir(INPUT_BASE, entier(10));
        p.definir(OUTPUT_BASE, entier(10));
        p
    }

    pub fn get(&self, nom: &str) -> Option<&BigRational> {
        self.liaisons.get(nom)
    }

    pub fn contient(&self, nom: &str) -> bool {
        self.liaisons.contains_key(nom)
    }

    /// Écrase si présent, insère sinon. Aucun contrôle (voir `affecter`).
    pub fn definir(&mut self, nom: impl Into<String>, valeur: BigRational) {
        self.liaisons.insert(nom.into(), valeur);
    }

    /// Affectation utilisateur (`nom := valeur`) : contrôle le nom, et la
    /// valeur quand le nom est un réglage réservé. En cas d’erreur la portée
    /// reste intacte. `$precision` est ramenée à `0..=PRECISION_MAX`.
    pub fn affecter(&mut self, nom: &str, valeur: BigRational) -> Result<(), Erreur> {
        if !est_nom_valide(nom) {
            return Err(Erreur::NomInvalide(nom.to_string()));
        }
        verifier_reglage(nom, &valeur)?;

        let valeur = if nom == PRECISION {
            BigRational::from_integer(BigInt::from(precision_depuis(&valeur)))
        } else {
            valeur
        };
        self.definir(nom, valeur);
        Ok(())
    }

    /// Liaisons dans l’ordre des noms.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BigRational)> {
        self.liaisons.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.liaisons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.liaisons.is_empty()
    }

    /// Vue typée des réglages (valeurs absentes => défauts).
    pub fn reglages(&self) -> Result<Reglages, Erreur> {
        let precision = match self.get(PRECISION) {
            Some(v) => precision_depuis(v),
            None => 30,
        };
        let base = |nom: &str| match self.get(nom) {
            Some(v) => Base::new(v.clone()),
            None => Base::new(entier(10)),
        };

        Ok(Reglages {
            precision,
            input_base: base(INPUT_BASE)?,
            output_base: base(OUTPUT_BASE)?,
            frac: self.get(FRAC).is_some_and(|v| !v.is_zero()),
            epsilon: self.get(EPSILON).filter(|v| v.is_positive()).cloned(),
        })
    }
}

/// Réglages validés, lus dans la portée au début de chaque ligne.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reglages {
    pub precision: usize,
    pub input_base: Base,
    pub output_base: Base,
    pub frac: bool,
    pub epsilon: Option<BigRational>,
}

impl Reglages {
    /// Tolérance de `nroot` : $epsilon si présent, sinon $output_base^-$precision.
    pub fn epsilon(&self) -> BigRational {
        match &self.epsilon {
            Some(e) => e.clone(),
            None => self.output_base.valeur().pow(self.precision as i32).recip(),
        }
    }
}

fn entier(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// Identifiant : lettres/chiffres/_/$, sans chiffre en tête.
pub fn est_nom_valide(nom: &str) -> bool {
    let mut chars = nom.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

/// Partie entière, ramenée à 0..=PRECISION_MAX.
fn precision_depuis(v: &BigRational) -> usize {
    if v.is_negative() {
        return 0;
    }
    v.to_integer()
        .to_usize()
        .map_or(PRECISION_MAX, |p| p.min(PRECISION_MAX))
}

fn verifier_reglage(nom: &str, valeur: &BigRational) -> Result<(), Erreur> {
    match nom {
        INPUT_BASE | OUTPUT_BASE => Base::new(valeur.clone()).map(|_| ()),
        EPSILON if !valeur.is_positive() => Err(Erreur::ReglageInvalide {
            nom: nom.to_string(),
            valeur: valeur.clone(),
            raison: "doit être > 0".to_string(),
        }),
        _ => Ok(()),
    }
}
