// src/noyau/racines.rs
//
// Recherche de racines sur Q (bissection, Brent, Newton) + racine n-ième.
//
// Contrats :
// - f : Fn(&BigRational) -> BigRational, quelconque.
// - On résout f(x) = cible via g(x) = f(x) - cible.
// - Plafond MAX_ITERATIONS partout (nroot compris) : au plafond, on rend la
//   meilleure estimation, sans erreur. L’appelant lit iterations/erreur_estimee.
// - Brent/Newton/nroot arrondissent leurs itérés sur une grille tolérance/16 :
//   en rationnels exacts, sans ça, la taille des fractions explose.

use log::debug;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::erreur::Erreur;

pub const MAX_ITERATIONS: usize = 50;

/// Finesse de la grille d’arrondi des itérés (pas = tolérance / 16).
const FINESSE_GRILLE: i64 = 16;

/// Garde-fou nroot : taille maximale (en bits) des puissances intermédiaires.
const NROOT_BITS_MAX: u64 = 4_000_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Options {
    pub tolerance: BigRational,
    pub cible: BigRational,
}

impl Default for Options {
    /// Tolérance 1e-8, cible 0.
    fn default() -> Self {
        Self {
            tolerance: BigRational::new(BigInt::one(), BigInt::from(100_000_000)),
            cible: BigRational::zero(),
        }
    }
}

impl Options {
    pub fn avec_tolerance(tolerance: BigRational) -> Self {
        Self {
            tolerance,
            ..Self::default()
        }
    }

    pub fn cible(mut self, cible: BigRational) -> Self {
        self.cible = cible;
        self
    }
}

/// Racine approchée + comptabilité de convergence.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Racine {
    pub valeur: BigRational,
    pub iterations: usize,
    /// Largeur finale du crochet (bissection), demi-crochet (Brent) ou dernier pas (Newton).
    pub erreur_estimee: BigRational,
}

/* ------------------------ Outils ------------------------ */

fn entier(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn verifier_tolerance(tolerance: &BigRational) -> Result<(), Erreur> {
    if tolerance.is_positive() {
        Ok(())
    } else {
        Err(Erreur::ToleranceInvalide(tolerance.clone()))
    }
}

/// g(gauche) et g(droite) de signes strictement opposés.
fn verifier_crochet(
    g_gauche: &BigRational,
    g_droite: &BigRational,
    cible: &BigRational,
) -> Result<(), Erreur> {
    let opposes = (g_gauche.is_negative() && g_droite.is_positive())
        || (g_gauche.is_positive() && g_droite.is_negative());
    if opposes {
        return Ok(());
    }
    Err(Erreur::CrochetInvalide {
        cible: cible.clone(),
        f_gauche: g_gauche + cible,
        f_droite: g_droite + cible,
    })
}

/// x arrondi au multiple de `pas` le plus proche.
fn arrondir(x: &BigRational, pas: &BigRational) -> BigRational {
    (x / pas).round() * pas
}

fn grille(tolerance: &BigRational) -> BigRational {
    tolerance / entier(FINESSE_GRILLE)
}

/* ------------------------ Bissection ------------------------ */

/// Bissection sur [gauche, droite].
///
/// Rend le bord gauche du crochet final ; erreur estimée = largeur finale
/// (0 si un milieu annule g exactement).
pub fn bisect<F>(
    f: F,
    gauche: BigRational,
    droite: BigRational,
    options: &Options,
) -> Result<Racine, Erreur>
where
    F: Fn(&BigRational) -> BigRational,
{
    verifier_tolerance(&options.tolerance)?;
    let g = |x: &BigRational| f(x) - &options.cible;

    let (mut gauche, droite) = if gauche <= droite {
        (gauche, droite)
    } else {
        (droite, gauche)
    };

    let mut g_gauche = g(&gauche);
    let g_droite = g(&droite);
    verifier_crochet(&g_gauche, &g_droite, &options.cible)?;

    let deux = entier(2);
    let mut largeur = &droite - &gauche;
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS && largeur > options.tolerance {
        largeur /= &deux;
        let milieu = &gauche + &largeur;
        let g_milieu = g(&milieu);
        iterations += 1;

        if g_milieu.is_zero() {
            return Ok(Racine {
                valeur: milieu,
                iterations,
                erreur_estimee: BigRational::zero(),
            });
        }

        // g change de signe dans (milieu, droite) : on garde la moitié droite
        if g_gauche.is_negative() == g_milieu.is_negative() {
            gauche = milieu;
            g_gauche = g_milieu;
        }
    }

    debug!("bisect : {iterations} itérations, largeur {largeur}");
    Ok(Racine {
        valeur: gauche,
        iterations,
        erreur_estimee: largeur,
    })
}

/* ------------------------ Brent ------------------------ */

/// Méthode de Brent (interpolation quadratique inverse / sécante / bissection).
///
/// Notation : a = itéré précédent, b = meilleure estimation, c = autre bord
/// du crochet ; d = dernier pas, e = avant-dernier.
pub fn brent<F>(
    f: F,
    gauche: BigRational,
    droite: BigRational,
    options: &Options,
) -> Result<Racine, Erreur>
where
    F: Fn(&BigRational) -> BigRational,
{
    verifier_tolerance(&options.tolerance)?;
    let g = |x: &BigRational| f(x) - &options.cible;

    let t = &options.tolerance;
    let pas = grille(t);
    let un = BigRational::one();
    let deux = entier(2);
    let trois = entier(3);

    let mut a = gauche;
    let mut b = droite;
    let mut fa = g(&a);
    let mut fb = g(&b);
    verifier_crochet(&fa, &fb, &options.cible)?;

    let mut c = a.clone();
    let mut fc = fa.clone();
    let mut d = &b - &a;
    let mut e = d.clone();
    let mut iterations = 0;

    loop {
        // b doit rester la meilleure estimation
        if fc.abs() < fb.abs() {
            std::mem::swap(&mut b, &mut c);
            a = c.clone();
            std::mem::swap(&mut fb, &mut fc);
            fa = fc.clone();
        }

        iterations += 1;

        let tol = &deux * t * b.abs() + t;
        let m = (&c - &b) / &deux;

        if m.abs() <= tol || fb.is_zero() {
            debug!("brent : convergé en {iterations} itérations");
            return Ok(Racine {
                valeur: b,
                iterations,
                erreur_estimee: m.abs(),
            });
        }

        if e.abs() < tol || fa.abs() <= fb.abs() {
            // bisection forcée
            d = m.clone();
            e = m.clone();
        } else {
            let s = &fb / &fa;
            let (mut p, mut q) = if a == c {
                // interpolation linéaire
                (&deux * &m * &s, &un - &s)
            } else {
                // interpolation quadratique inverse
                let q = &fa / &fc;
                let r = &fb / &fc;
                let p = &s * (&deux * &m * &q * (&q - &r) - (&b - &a) * (&r - &un));
                let q = (&q - &un) * (&r - &un) * (&s - &un);
                (p, q)
            };

            if p.is_positive() {
                q = -q;
            } else {
                p = -p;
            }

            let e_prec = std::mem::replace(&mut e, d.clone());
            let dans_le_crochet = &deux * &p < &trois * &m * &q - (&tol * &q).abs();
            let progresse = p < (&e_prec * &q / &deux).abs();

            if dans_le_crochet && progresse {
                d = &p / &q;
            } else {
                d = m.clone();
                e = m.clone();
            }
        }

        a = b.clone();
        fa = fb.clone();

        // pas minimal : tol, vers c
        let saut = if d.abs() > tol {
            d.clone()
        } else if m.is_positive() {
            tol
        } else {
            -tol
        };
        b = arrondir(&(&b + saut), &pas);

        if iterations == MAX_ITERATIONS {
            debug!("brent : plafond de {MAX_ITERATIONS} itérations atteint");
            return Ok(Racine {
                valeur: b,
                iterations,
                erreur_estimee: m.abs(),
            });
        }

        fb = g(&b);

        // re-crochet : c doit rester de l’autre côté de b
        if fb.is_positive() == fc.is_positive() {
            c = a.clone();
            fc = fa.clone();
            d = &b - &a;
            e = d.clone();
        }
    }
}

/* ------------------------ Newton ------------------------ */

/// Newton–Raphson : x <- x - g(x)/f'(x) (g et f ont la même dérivée).
///
/// Dérivée nulle => DivisionParZero (fatal). Au plafond, le résultat n’est pas
/// garanti : lire `iterations` / `erreur_estimee`.
pub fn newton<F, D>(
    f: F,
    fprime: D,
    depart: BigRational,
    options: &Options,
) -> Result<Racine, Erreur>
where
    F: Fn(&BigRational) -> BigRational,
    D: Fn(&BigRational) -> BigRational,
{
    verifier_tolerance(&options.tolerance)?;

    let pas = grille(&options.tolerance);
    let mut x = depart;
    let mut erreur = &options.tolerance * entier(2);
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS && erreur > options.tolerance {
        let gx = f(&x) - &options.cible;
        let gpx = fprime(&x);
        if gpx.is_zero() {
            return Err(Erreur::DivisionParZero);
        }

        let suivant = arrondir(&(&x - gx / gpx), &pas);
        erreur = (&suivant - &x).abs();
        x = suivant;
        iterations += 1;
    }

    debug!("newton : {iterations} itérations, dernier pas {erreur}");
    Ok(Racine {
        valeur: x,
        iterations,
        erreur_estimee: erreur,
    })
}

/* ------------------------ Racine n-ième ------------------------ */

/// Racine `racine`-ième de `nombre`, à `epsilon` près (Newton sur x^n = nombre).
///
/// - racine < 0 : inverse de la racine positive
/// - nombre < 0 : racine impaire seulement
pub fn nroot(nombre: &BigRational, racine: i64, epsilon: &BigRational) -> Result<BigRational, Erreur> {
    verifier_tolerance(epsilon)?;

    if racine == 0 {
        return Err(Erreur::RacineInvalide("racine d’ordre 0".into()));
    }

    if racine < 0 {
        let positive = racine
            .checked_neg()
            .ok_or_else(|| Erreur::RacineInvalide(format!("ordre trop grand : {racine}")))?;
        let r = nroot(nombre, positive, epsilon)?;
        if r.is_zero() {
            return Err(Erreur::DivisionParZero);
        }
        return Ok(r.recip());
    }

    if nombre.is_zero() || racine == 1 {
        return Ok(nombre.clone());
    }

    if nombre.is_negative() {
        if racine % 2 == 0 {
            return Err(Erreur::RacineInvalide(format!(
                "racine d’ordre pair ({racine}) d’un nombre négatif ({nombre})"
            )));
        }
        return nroot(&-nombre, racine, epsilon).map(|r| -r);
    }

    let ordre = i32::try_from(racine)
        .map_err(|_| Erreur::RacineInvalide(format!("ordre trop grand : {racine}")))?;
    let n = entier(racine);
    let pas = grille(epsilon);

    // x^(racine-1) sur la grille : ~ racine * bits(pas) bits par itération
    let bits_pas = pas.numer().bits() + pas.denom().bits();
    if u64::try_from(racine).map_or(true, |r| r.saturating_mul(bits_pas) > NROOT_BITS_MAX) {
        return Err(Erreur::RacineInvalide(format!("ordre trop grand : {racine}")));
    }

    let mut x = depart_nroot(nombre, racine);

    for iterations in 1..=MAX_ITERATIONS {
        let part = x.pow(ordre - 1);
        if part.is_zero() {
            // racine sous la résolution de la grille
            return Ok(x);
        }

        let suivant = arrondir(&(&x - (&part * &x - nombre) / (&n * &part)), &pas);
        if (&suivant - &x).abs() <= *epsilon {
            debug!("nroot : {iterations} itérations");
            return Ok(suivant);
        }
        x = suivant;
    }

    debug!("nroot : plafond de {MAX_ITERATIONS} itérations atteint pour {nombre}^(1/{racine})");
    Ok(x)
}

/// Point de départ : estimation f64 si représentable, sinon 2^⌈k/n⌉ (majorant).
fn depart_nroot(nombre: &BigRational, racine: i64) -> BigRational {
    let estimation = nombre
        .to_f64()
        .map(|v| v.powf(1.0 / racine as f64))
        .filter(|s| s.is_finite() && *s > 0.0)
        .and_then(BigRational::from_float);
    if let Some(x) = estimation {
        return x;
    }

    // nombre < 2^k
    let k = nombre.numer().bits() as i64 - nombre.denom().bits() as i64 + 1;
    let e = k.div_euclid(racine) + i64::from(k.rem_euclid(racine) != 0);
    let deux = entier(2);
    match i32::try_from(e) {
        Ok(e) => deux.pow(e),
        Err(_) => deux,
    }
}
