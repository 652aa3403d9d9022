//! Tests scientifiques (campagne) : invariants + robustesse + limites contrôlées.
//!
//! But : trouver les limites sans faire chauffer la machine.
//! - budget temps global
//! - tailles bornées (profondeur, longueur)
//! - précision bornée pour le formatage
//!
//! Notes :
//! - Le formatage TRONQUE : parse(format(v)) ≤ v, à moins de base^-precision.
//! - Les racines (bissection/Brent/Newton) sont testées sur x²-2, x³-2x-5 et
//!   un polynôme à racine triple (pire cas pour Brent en rationnels exacts).

use std::time::{Duration, Instant};

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::base_n::{format, parse, Base};
use super::erreur::Erreur;
use super::eval_expression;
use super::portee::{Portee, FRAC, OUTPUT_BASE, PRECISION};
use super::racines::{bisect, brent, newton, nroot, Options, MAX_ITERATIONS};

fn rat(n: i64, d: i64) -> BigRational {
    BigRational::new(BigInt::from(n), BigInt::from(d))
}

fn eval_ok(expr: &str, portee: &mut Portee) -> BigRational {
    let base = portee.reglages().unwrap().input_base;
    eval_expression(expr, &base, portee)
        .unwrap_or_else(|e| panic!("expr={expr:?} err={e}"))
        .valeur
}

/// Ligne affichée telle que la calculatrice l’imprime (réglages de la portée).
fn affiche(expr: &str, portee: &mut Portee) -> String {
    let v = eval_ok(expr, portee);
    let r = portee.reglages().unwrap();
    format(&v, &r.output_base, r.precision, r.frac).unwrap()
}

/// Budget global anti-gel (scientifique + safe).
fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

fn racine_de_deux_1e8(r: &BigRational) -> bool {
    // |r - √2| ≤ 1e-8  <=>  r² proche de 2 (r ∈ [1, 2])
    (r * r - rat(2, 1)).abs() <= rat(3, 100_000_000)
}

/* ------------------------ Arithmétique de la calculatrice ------------------------ */

#[test]
fn sci_precedence() {
    let mut p = Portee::par_defaut();
    assert_eq!(eval_ok("2+3*4", &mut p), rat(14, 1));
    assert_eq!(eval_ok("2*3+4", &mut p), rat(10, 1));
    assert_eq!(eval_ok("2+3-4", &mut p), rat(1, 1));
    assert_eq!(eval_ok("(2+3)*4", &mut p), rat(20, 1));
    assert_eq!(eval_ok("5^(-2)", &mut p), rat(1, 25));
}

#[test]
fn sci_division_par_zero_incident() {
    let mut p = Portee::par_defaut();
    let ev = eval_expression("5/0", &Base::dix(), &mut p).unwrap();
    assert!(ev.valeur.is_zero());
    assert_eq!(ev.incidents, vec![Erreur::DivisionParZero]);
}

#[test]
fn sci_session_affectation() {
    let mut p = Portee::par_defaut();
    eval_ok("x:=7", &mut p);
    assert_eq!(eval_ok("x+1", &mut p), rat(8, 1));
}

#[test]
fn sci_session_reglages() {
    let mut p = Portee::par_defaut();

    eval_ok(&format!("{OUTPUT_BASE} := 16"), &mut p);
    assert_eq!(affiche("255", &mut p), "FF");

    // entrée en base 2, affectation toujours en base 10
    eval_ok("$input_base := 2", &mut p);
    assert_eq!(affiche("1111", &mut p), "F");
    eval_ok("z := 1111", &mut p);
    assert_eq!(p.get("z"), Some(&rat(1111, 1)));

    eval_ok("$input_base := 10", &mut p);
    eval_ok(&format!("{OUTPUT_BASE} := 10"), &mut p);
    eval_ok(&format!("{PRECISION} := 4"), &mut p);
    assert_eq!(affiche("1/3", &mut p), "0.3333");

    eval_ok(&format!("{FRAC} := 1"), &mut p);
    assert_eq!(affiche("1/3", &mut p), "1/3");
}

#[test]
fn sci_puissances_fractionnaires_vs_root() {
    let mut p = Portee::par_defaut();
    eval_ok(&format!("{PRECISION} := 20"), &mut p);
    let a = eval_ok("2^(3/2)", &mut p);
    let b = eval_ok("root(2^3, 2)", &mut p);
    assert_eq!(a, b);

    let tiers = eval_ok("27^(-1/3)", &mut p);
    assert!((tiers - rat(1, 3)).abs() < rat(1, 1_000_000_000_000_000_000));
}

/* ------------------------ Codec : mode fraction ------------------------ */

#[test]
fn sci_mode_fraction_reconstruit_n_et_d() {
    let p = Portee::vide();
    for b in [2u32, 3, 7, 10, 16, 36, 42] {
        let base = Base::entiere(b).unwrap();
        for v in [rat(3, 4), rat(-22, 7), rat(1, 1000), rat(123456789, 1024)] {
            let s = format(&v, &base, 30, true).unwrap();
            assert_eq!(s.matches('/').count(), 1, "base={b} s={s:?}");

            let (n, d) = s.split_once('/').unwrap();
            let n = parse(n, &base, &p).unwrap();
            let d = parse(d, &base, &p).unwrap();
            assert_eq!(n, BigRational::from_integer(v.numer().clone()), "base={b}");
            assert_eq!(d, BigRational::from_integer(v.denom().clone()), "base={b}");
        }
    }
}

#[test]
fn sci_aller_retour_troncature() {
    let p = Portee::vide();
    for b in [2u32, 5, 10, 12, 16, 42] {
        let base = Base::entiere(b).unwrap();
        let pas = base.valeur().pow(8).recip();
        for v in [rat(1, 3), rat(-1, 7), rat(355, 113), rat(-1000001, 999)] {
            let s = format(&v, &base, 8, false).unwrap();
            let w = parse(&s, &base, &p).unwrap();
            let ecart = v.abs() - w.abs();
            assert!(!ecart.is_negative() && ecart < pas, "base={b} v={v} s={s:?}");
        }
    }
}

/* ------------------------ Racines : convergence ------------------------ */

#[test]
fn sci_racines_de_deux() {
    let f = |x: &BigRational| x * x - rat(2, 1);
    let o = Options::default();

    let bi = bisect(f, rat(1, 1), rat(2, 1), &o).unwrap();
    let br = brent(f, rat(1, 1), rat(2, 1), &o).unwrap();
    let nw = newton(f, |x: &BigRational| x * rat(2, 1), rat(1, 1), &o).unwrap();

    assert!(racine_de_deux_1e8(&bi.valeur));
    assert!(racine_de_deux_1e8(&br.valeur));
    assert!(racine_de_deux_1e8(&nw.valeur));

    assert!(br.iterations <= bi.iterations);
    assert!(nw.iterations < 10);
}

#[test]
fn sci_cible_non_nulle() {
    // x³ = 2 sur [1, 2]
    let f = |x: &BigRational| x * x * x;
    let o = Options::default().cible(rat(2, 1));
    let r = brent(f, rat(1, 1), rat(2, 1), &o).unwrap();
    assert!((&r.valeur * &r.valeur * &r.valeur - rat(2, 1)).abs() < rat(1, 1_000_000));
}

#[test]
fn sci_polynome_de_wallis() {
    // x³ - 2x - 5, racine ≈ 2.0945514815
    let f = |x: &BigRational| x * x * x - x * rat(2, 1) - rat(5, 1);
    let o = Options::default();
    let r = brent(f, rat(2, 1), rat(3, 1), &o).unwrap();
    let attendu = rat(20945514815, 10_000_000_000);
    assert!((&r.valeur - attendu).abs() < rat(1, 1_000_000));
}

#[test]
fn sci_racine_triple_bornee() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    // x³ sur [-1, 2] : racine triple en 0
    let f = |x: &BigRational| x * x * x;
    let r = brent(f, rat(-1, 1), rat(2, 1), &Options::default()).unwrap();
    budget(t0, max);

    assert!(r.iterations <= MAX_ITERATIONS);
    assert!(r.valeur.abs() < rat(1, 10));
}

#[test]
fn sci_preconditions() {
    let f = |x: &BigRational| x * x - rat(2, 1);
    let o = Options::default();

    assert!(matches!(
        bisect(f, rat(2, 1), rat(3, 1), &o),
        Err(Erreur::CrochetInvalide { .. })
    ));
    assert!(matches!(
        brent(f, rat(-1, 1), rat(1, 1), &o),
        Err(Erreur::CrochetInvalide { .. })
    ));

    let nulle = Options::avec_tolerance(BigRational::zero());
    assert!(matches!(
        bisect(f, rat(1, 1), rat(2, 1), &nulle),
        Err(Erreur::ToleranceInvalide(_))
    ));
    assert!(matches!(
        newton(f, |x: &BigRational| x * rat(2, 1), rat(1, 1), &nulle),
        Err(Erreur::ToleranceInvalide(_))
    ));
}

/* ------------------------ Stress contrôlé (sans brûler) ------------------------ */

#[test]
fn sci_stress_nroot_ordres() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let eps = rat(1, 1) / BigRational::from_integer(BigInt::from(10)).pow(20);
    for n in 2..=24i64 {
        let x = nroot(&rat(7, 1), n, &eps).unwrap();
        let puissance = x.pow(n as i32);
        // |x^n - 7| ≤ n·7·eps (ordre de grandeur)
        assert!(
            (puissance - rat(7, 1)).abs() < &eps * rat(8 * n, 1),
            "ordre {n}"
        );
        budget(t0, max);
    }
}

#[test]
fn sci_stress_taille_somme_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(1);

    let mut expr = String::new();
    for k in 0..80 {
        if k > 0 {
            expr.push_str(" + ");
        }
        expr.push_str("1/2");
    }
    let mut p = Portee::par_defaut();
    assert_eq!(eval_ok(&expr, &mut p), rat(40, 1));
    budget(t0, max);
}

#[test]
fn sci_stress_bigint_safe() {
    let t0 = Instant::now();
    let max = Duration::from_secs(1);

    // gros numérateur contrôlé (100 chiffres)
    let big = "9".repeat(100);
    let mut p = Portee::par_defaut();
    let v = eval_ok(&format!("({big}+1)/10^100"), &mut p);
    assert!(v.is_one());

    let s = affiche(&format!("{big}/7 + 1/7"), &mut p);
    assert!(!s.is_empty());
    budget(t0, max);
}

#[test]
fn sci_stress_ecriture_grande_puissance() {
    let t0 = Instant::now();
    let max = Duration::from_secs(5);

    let deux_puissance = |n: u32| BigRational::from_integer(BigInt::from(2).pow(n));

    let v = deux_puissance(100_000);
    let dix = format(&v, &Base::dix(), 30, false).unwrap();
    assert_eq!(dix, v.numer().to_string());
    assert_eq!(dix.len(), 30103);

    let hexa = format(&v, &Base::entiere(16).unwrap(), 30, false).unwrap();
    assert_eq!(hexa, format!("1{}", "0".repeat(25_000)));

    // via la ligne complète : 2^300000 a 90309 chiffres décimaux
    let mut p = Portee::par_defaut();
    assert_eq!(affiche("2^300000", &mut p).len(), 90309);

    // base rationnelle : chiffres 0..=2 seulement
    let b = Base::new(rat(5, 2)).unwrap();
    let s = format(&deux_puissance(15_000), &b, 10, false).unwrap();
    assert!(s.len() > 10_000);
    assert!(s.chars().all(|c| matches!(c, '0' | '1' | '2' | '.')));
    budget(t0, max);
}

#[test]
fn sci_ecriture_refusee_au_dela_des_limites() {
    let trop = BigRational::from_integer(BigInt::from(2).pow(1_000_001));
    assert!(matches!(
        format(&trop, &Base::dix(), 30, false),
        Err(Erreur::NombreTropLong { .. })
    ));
    assert!(matches!(
        format(&trop.recip(), &Base::dix(), 30, true),
        Err(Erreur::NombreTropLong { .. })
    ));

    let b = Base::new(rat(5, 2)).unwrap();
    let moyen = BigRational::from_integer(BigInt::from(2).pow(20_001));
    assert!(matches!(
        format(&moyen, &b, 10, false),
        Err(Erreur::NombreTropLong { .. })
    ));
    assert!(format(&moyen, &Base::dix(), 10, false).is_ok());
}
