//! Tests de propriétés : codec base N + pipeline d’évaluation.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Signed;
use proptest::prelude::*;

use super::base_n::{format, parse, Base};
use super::eval_expression;
use super::portee::Portee;

// rationnels bornés, dénominateur non nul
fn rationnel() -> impl Strategy<Value = BigRational> {
    (-1_000_000i64..1_000_000i64, 1i64..10_000i64)
        .prop_map(|(n, d)| BigRational::new(BigInt::from(n), BigInt::from(d)))
}

fn base_entiere() -> impl Strategy<Value = Base> {
    (2u32..=42u32).prop_map(|b| Base::entiere(b).unwrap())
}

// base rationnelle p/q avec 2 ≤ p/q et ⌈p/q⌉ ≤ 42
fn base_rationnelle() -> impl Strategy<Value = Base> {
    (1i64..8i64, 0i64..40i64).prop_map(|(q, k)| {
        let p = 2 * q + k * q / 3 + 1;
        Base::new(BigRational::new(BigInt::from(p), BigInt::from(q)))
            .unwrap_or_else(|_| Base::dix())
    })
}

proptest! {
    #[test]
    fn aller_retour_tronque(v in rationnel(), base in base_entiere(), precision in 0usize..24) {
        let s = format(&v, &base, precision, false).unwrap();
        let w = parse(&s, &base, &Portee::vide()).unwrap();

        // troncature vers zéro : |w| ≤ |v| < |w| + base^-precision
        let ecart = v.abs() - w.abs();
        let pas = base.valeur().pow(precision as i32).recip();
        prop_assert!(!ecart.is_negative(), "s={}", s);
        prop_assert!(ecart < pas, "s={}", s);
    }

    #[test]
    fn aller_retour_base_rationnelle(v in rationnel(), base in base_rationnelle()) {
        let s = format(&v, &base, 12, false).unwrap();
        let w = parse(&s, &base, &Portee::vide()).unwrap();
        let pas = base.valeur().pow(12).recip();
        prop_assert!((v.abs() - w.abs()) < pas, "base={} s={}", base, s);
    }

    #[test]
    fn mode_fraction_exact(v in rationnel(), base in base_entiere()) {
        let s = format(&v, &base, 0, true).unwrap();
        let mut p = Portee::vide();
        let ev = eval_expression(&s, &base, &mut p).unwrap();
        prop_assert_eq!(ev.valeur, v);
    }

    #[test]
    fn addition_commutative(a in rationnel(), b in rationnel()) {
        let dix = Base::dix();
        let sa = format(&a, &dix, 0, true).unwrap();
        let sb = format(&b, &dix, 0, true).unwrap();
        let mut p = Portee::par_defaut();
        let ab = eval_expression(&format!("({sa})+({sb})"), &dix, &mut p).unwrap();
        let ba = eval_expression(&format!("({sb})+({sa})"), &dix, &mut p).unwrap();
        prop_assert_eq!(&ab.valeur, &ba.valeur);
        prop_assert_eq!(ab.valeur, a + b);
    }

    #[test]
    fn carre_de_la_racine(n in 1i64..1_000_000i64) {
        let mut p = Portee::par_defaut();
        let ev = eval_expression(&format!("sqrt({n})^2 - {n}"), &Base::dix(), &mut p).unwrap();
        // $precision = 30 => epsilon = 1e-30
        let borne = BigRational::new(BigInt::from(4 * n), BigInt::from(10).pow(30));
        prop_assert!(ev.valeur.abs() < borne, "n={}", n);
    }
}
