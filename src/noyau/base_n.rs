// src/noyau/base_n.rs
//
// Codec base N : texte positionnel <-> rationnel exact.
//
// - Alphabet fixe de 42 symboles (l’ordre définit la valeur).
// - Lecture insensible à la casse, séparateur ',' ou '.'.
// - Écriture tronquée à `precision` chiffres après le séparateur, ou en
//   fraction n/d (mode fraction). Les chiffres sont tirés d’entiers mis à
//   l’échelle ; un nombre trop long est refusé (NombreTropLong).

use std::fmt;

use num_bigint::{BigInt, BigUint};
use num_rational::BigRational;
use num_traits::{Signed, ToPrimitive, Zero};

use super::erreur::Erreur;
use super::portee::{Portee, PRECISION_MAX};

/// Symboles des chiffres, dans l’ordre des valeurs (0..42).
pub const ALPHABET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZÆØÅÐÞŒ";

/// Base maximale = longueur de l’alphabet.
pub const BASE_MAX: usize = 42;

/// Base validée : 2 ≤ base et ⌈base⌉ ≤ 42 (une base rationnelle est permise).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Base {
    valeur: BigRational,
    chiffres: usize,
}

impl Base {
    pub fn new(valeur: BigRational) -> Result<Self, Erreur> {
        if valeur < BigRational::from_integer(BigInt::from(2)) {
            return Err(Erreur::BaseInvalide(valeur));
        }

        let chiffres = valeur
            .ceil()
            .to_integer()
            .to_usize()
            .filter(|&n| n <= BASE_MAX)
            .ok_or_else(|| Erreur::BaseInvalide(valeur.clone()))?;

        Ok(Self { valeur, chiffres })
    }

    /// Base entière (2..=42).
    pub fn entiere(n: u32) -> Result<Self, Erreur> {
        Self::new(BigRational::from_integer(BigInt::from(n)))
    }

    pub fn dix() -> Self {
        Self {
            valeur: BigRational::from_integer(BigInt::from(10)),
            chiffres: 10,
        }
    }

    pub fn valeur(&self) -> &BigRational {
        &self.valeur
    }

    /// Nombre de symboles valides dans cette base (⌈base⌉).
    pub fn chiffres(&self) -> usize {
        self.chiffres
    }

    /// Radix entier (2..=42), si la base n’est pas fractionnaire.
    pub fn radix_entier(&self) -> Option<u32> {
        if self.valeur.is_integer() {
            self.valeur.to_integer().to_u32()
        } else {
            None
        }
    }
}

impl fmt::Display for Base {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.valeur)
    }
}

/// Symbole de valeur `i`, s’il existe.
pub fn symbole(i: usize) -> Option<char> {
    ALPHABET.chars().nth(i)
}

/// Valeur du symbole `c` parmi les `n` premiers (insensible à la casse).
fn valeur_symbole(c: char, n: usize) -> Option<u32> {
    let mut maj = c.to_uppercase();
    let c = match (maj.next(), maj.next()) {
        (Some(m), None) => m,
        _ => return None,
    };
    ALPHABET
        .chars()
        .take(n)
        .position(|s| s == c)
        .map(|i| i as u32)
}

/* ------------------------ Écriture ------------------------ */

/// Garde-fou : taille (en bits) au-delà de laquelle un nombre n’est pas écrit
/// en base entière (une seule conversion d’entier).
pub const ECRITURE_BITS_MAX: u64 = 1_000_000;

/// Idem en base rationnelle : une division par chiffre.
pub const ECRITURE_BITS_MAX_RATIONNELLE: u64 = 20_000;

/// Rationnel -> texte en base `base`.
///
/// `fraction` : si vrai et dénominateur ≠ 1, écrit `n/d` (chacun en base `base`).
/// `precision` est ramenée à `PRECISION_MAX`.
pub fn format(
    valeur: &BigRational,
    base: &Base,
    precision: usize,
    fraction: bool,
) -> Result<String, Erreur> {
    if fraction && !valeur.is_integer() {
        let n = BigRational::from_integer(valeur.numer().clone());
        let d = BigRational::from_integer(valeur.denom().clone());
        return Ok(format!(
            "{}/{}",
            format_positionnel(&n, base, 0)?,
            format_positionnel(&d, base, 0)?
        ));
    }
    format_positionnel(valeur, base, precision.min(PRECISION_MAX))
}

fn format_positionnel(valeur: &BigRational, base: &Base, precision: usize) -> Result<String, Erreur> {
    let radix_entier = base.radix_entier();

    let bits = valeur.numer().bits().max(valeur.denom().bits());
    let max = match radix_entier {
        Some(_) => ECRITURE_BITS_MAX,
        None => ECRITURE_BITS_MAX_RATIONNELLE,
    };
    if bits > max {
        return Err(Erreur::NombreTropLong {
            bits,
            base: base.to_string(),
        });
    }

    // precision ≤ PRECISION_MAX
    let p = precision as u32;
    let n = valeur.numer().magnitude();
    let d = valeur.denom().magnitude();

    let chiffres = match radix_entier {
        Some(r) => chiffres_base_entiere(n, d, r, p),
        None => chiffres_base_rationnelle(n, d, base.valeur(), p),
    };

    // au moins un chiffre entier : chiffres.len() ≥ precision + 1
    let coupe = chiffres.len() - precision;
    let mut s = String::with_capacity(chiffres.len() + 2);
    for (i, &c) in chiffres.iter().enumerate() {
        if i == coupe {
            s.push('.');
        }
        // c < ⌈radix⌉ par construction
        s.push(symbole(usize::from(c)).unwrap_or('?'));
    }

    let mut s = if precision > 0 {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s
    };

    if valeur.is_negative() && s != "0" {
        s.insert(0, '-');
    }
    Ok(s)
}

/// Chiffres de ⌊(n/d)·r^p⌋ en base r, complétés à gauche jusqu’à p + 1.
fn chiffres_base_entiere(n: &BigUint, d: &BigUint, r: u32, p: u32) -> Vec<u8> {
    let tronque = n * BigUint::from(r).pow(p) / d;
    let chiffres = tronque.to_radix_be(r);

    let longueur = p as usize + 1;
    if chiffres.len() >= longueur {
        return chiffres;
    }
    let mut complet = vec![0u8; longueur - chiffres.len()];
    complet.extend(chiffres);
    complet
}

/// Développement glouton en base a/b (non entière), sur des entiers :
/// chiffre k = ⌊reste / poids_k⌋ avec poids_k = d·a^(k+p)·b^(pow-k).
fn chiffres_base_rationnelle(n: &BigUint, d: &BigUint, radix: &BigRational, p: u32) -> Vec<u8> {
    let a = radix.numer().magnitude();
    let b = radix.denom().magnitude();

    // pow = plus grand k ≥ 0 tel que radix^k ≤ n/d (0 si n/d < radix)
    let mut pow: u32 = 0;
    let mut gauche = n * b;
    let mut droite = d * a;
    while gauche >= droite {
        pow += 1;
        gauche *= b;
        droite *= a;
    }

    let mut reste = n * b.pow(pow) * a.pow(p);
    let mut poids = d * a.pow(pow + p);

    let total = pow + p + 1;
    let mut chiffres = Vec::with_capacity(total as usize);
    for k in (0..total).rev() {
        let q = &reste / &poids;
        reste -= &q * &poids;
        chiffres.push(q.to_u8().unwrap_or(u8::MAX));

        if k > 0 {
            // exact : poids contient encore a^k
            poids = poids * b / a;
        }
    }
    chiffres
}

/* ------------------------ Lecture ------------------------ */

/// Texte -> rationnel, en base `base`.
///
/// - vide (ou espaces) => 0
/// - nom lié dans `portee` => sa valeur (aucune lecture de chiffres)
/// - sinon : signe '-' optionnel, chiffres, un séparateur ',' ou '.' au plus
pub fn parse(texte: &str, base: &Base, portee: &Portee) -> Result<BigRational, Erreur> {
    let t = texte.trim();
    if t.is_empty() {
        return Ok(BigRational::zero());
    }

    if let Some(v) = portee.get(t) {
        return Ok(v.clone());
    }

    let (negatif, corps) = match t.strip_prefix('-') {
        Some(reste) => (true, reste),
        None => (false, t),
    };

    let inconnu = |c: char| Erreur::ChiffreInconnu {
        chiffre: c,
        base: base.to_string(),
    };

    let radix = base.valeur();
    let mut n = BigRational::zero();
    let mut nb_chiffres: usize = 0;
    let mut nb_entiers: Option<usize> = None;

    for c in corps.chars() {
        if c == '.' || c == ',' {
            if nb_entiers.is_some() {
                return Err(inconnu(c));
            }
            nb_entiers = Some(nb_chiffres);
            continue;
        }

        let v = valeur_symbole(c, base.chiffres()).ok_or_else(|| inconnu(c))?;

        // Horner : n = n*radix + v (chiffres fractionnaires remis à l’échelle en fin)
        n = n * radix + BigRational::from_integer(BigInt::from(v));
        nb_chiffres += 1;
    }

    let nb_fraction = nb_chiffres - nb_entiers.unwrap_or(nb_chiffres);
    if nb_fraction > 0 {
        let e = i32::try_from(nb_fraction)
            .map_err(|_| Erreur::ExpressionInvalide("trop de chiffres".into()))?;
        n /= radix.pow(e);
    }

    Ok(if negatif { -n } else { n })
}
