//! Noyau : évaluation (pipeline réel)
//!
//! [nom :=] tokenize -> RPN -> Expr -> valeur exacte (BigRational)
//!
//! Les fautes récupérables (chiffre inconnu, division par zéro, ')' manquante)
//! n’arrêtent pas la ligne : elles sont journalisées (warn!) et rendues dans
//! `Evaluation::incidents`.

use log::{info, warn};
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::base_n::{self, Base};
use super::erreur::Erreur;
use super::expr::Expr;
use super::jetons::{format_tokens, tokenize};
use super::portee::{est_nom_valide, Portee};
use super::racines::nroot;
use super::rpn::{from_rpn, to_rpn};

/// Garde-fou : taille (en bits) au-delà de laquelle x^n est refusé. Alignée
/// sur ce que `base_n::format` accepte d’écrire.
const PUISSANCE_BITS_MAX: u64 = base_n::ECRITURE_BITS_MAX;

#[derive(Default, Clone, Debug, PartialEq, Eq)]
pub struct Demarche {
    pub jetons: String,
    pub rpn: String,
    pub arbre: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Evaluation {
    pub valeur: BigRational,
    pub incidents: Vec<Erreur>,
    pub demarche: Demarche,
}

/// API publique : évalue une ligne.
///
/// - `nom := expr` : `expr` est lue en base 10 quelle que soit `base`, puis
///   liée dans `portee` ; la valeur liée est rendue.
/// - ligne vide => 0
/// - sinon : `expr` lue en base `base`
pub fn eval_expression(
    expr_str: &str,
    base: &Base,
    portee: &mut Portee,
) -> Result<Evaluation, Erreur> {
    if let Some((gauche, droite)) = expr_str.split_once(":=") {
        let nom = gauche.trim();
        if !est_nom_valide(nom) {
            return Err(Erreur::NomInvalide(nom.to_string()));
        }

        let mut ev = evaluer(droite, &Base::dix(), portee)?;
        portee.affecter(nom, ev.valeur.clone())?;
        // valeur liée (un réglage peut être ramené dans ses bornes)
        if let Some(v) = portee.get(nom) {
            ev.valeur = v.clone();
        }
        info!("{nom} := {}", ev.valeur);
        return Ok(ev);
    }

    evaluer(expr_str, base, portee)
}

fn evaluer(s: &str, base: &Base, portee: &Portee) -> Result<Evaluation, Erreur> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Evaluation {
            valeur: BigRational::zero(),
            incidents: Vec::new(),
            demarche: Demarche::default(),
        });
    }

    let mut incidents = Vec::new();

    // 1) Jetons
    let jetons = tokenize(s)?;

    // 2) RPN (')' manquantes => incidents)
    let rpn = to_rpn(&jetons, &mut incidents)?;

    // 3) AST
    let arbre = from_rpn(&rpn)?;

    // 4) Valeur
    let mut ev = Evaluateur {
        base,
        portee,
        epsilon: portee.reglages()?.epsilon(),
        incidents,
    };
    let valeur = ev.valeur(&arbre)?;

    Ok(Evaluation {
        valeur,
        incidents: ev.incidents,
        demarche: Demarche {
            jetons: format_tokens(&jetons),
            rpn: format_tokens(&rpn),
            arbre: arbre.to_string(),
        },
    })
}

struct Evaluateur<'a> {
    base: &'a Base,
    portee: &'a Portee,
    epsilon: BigRational,
    incidents: Vec<Erreur>,
}

impl Evaluateur<'_> {
    fn incident(&mut self, e: Erreur) -> BigRational {
        warn!("{e}");
        self.incidents.push(e);
        BigRational::zero()
    }

    fn valeur(&mut self, e: &Expr) -> Result<BigRational, Erreur> {
        use Expr::*;
        Ok(match e {
            Litteral(mot) => match base_n::parse(mot, self.base, self.portee) {
                Ok(v) => v,
                Err(err) if err.est_recuperable() => self.incident(err),
                Err(err) => return Err(err),
            },

            Neg(x) => -self.valeur(x)?,

            Add(a, b) => self.valeur(a)? + self.valeur(b)?,
            Sub(a, b) => self.valeur(a)? - self.valeur(b)?,
            Mul(a, b) => self.valeur(a)? * self.valeur(b)?,
            Div(a, b) => {
                let a = self.valeur(a)?;
                let b = self.valeur(b)?;
                if b.is_zero() {
                    self.incident(Erreur::DivisionParZero)
                } else {
                    a / b
                }
            }

            Pow(a, b) => {
                let a = self.valeur(a)?;
                let b = self.valeur(b)?;
                self.puissance(&a, &b)?
            }

            Sqrt(x) => {
                let x = self.valeur(x)?;
                nroot(&x, 2, &self.epsilon)?
            }
            Root(x, n) => {
                let x = self.valeur(x)?;
                let n = self.valeur(n)?;
                let ordre = n
                    .trunc()
                    .to_integer()
                    .to_i64()
                    .ok_or_else(|| Erreur::RacineInvalide(format!("ordre trop grand : {n}")))?;
                nroot(&x, ordre, &self.epsilon)?
            }
        })
    }

    /// x^(n/d) = root(x^n, d).
    fn puissance(&mut self, x: &BigRational, exposant: &BigRational) -> Result<BigRational, Erreur> {
        if x.is_zero() {
            if exposant.is_negative() {
                // 0^-k = 1/0
                return Ok(self.incident(Erreur::DivisionParZero));
            }
            if exposant.is_zero() {
                return Ok(BigRational::one());
            }
            return Ok(BigRational::zero());
        }

        let trop_grand = || Erreur::ExposantTropGrand(exposant.to_string());

        let n = exposant.numer().to_i32().ok_or_else(trop_grand)?;
        let bits = x.numer().bits().max(x.denom().bits());
        if bits > 1 && bits.saturating_mul(u64::from(n.unsigned_abs())) > PUISSANCE_BITS_MAX {
            return Err(trop_grand());
        }
        let p = x.pow(n);

        let d = exposant.denom();
        if d.is_one() {
            return Ok(p);
        }
        let d = d.to_i64().ok_or_else(trop_grand)?;
        nroot(&p, d, &self.epsilon)
    }
}
