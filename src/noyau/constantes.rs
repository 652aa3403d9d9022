// src/noyau/constantes.rs
//
// Constantes nommées de la portée par défaut (e, π), en rationnels exacts.
// Calcul en entiers “scalés” (×10^digits), troncature, puis division exacte.

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::Zero;

/// Chiffres décimaux gardés pour e et π dans la portée par défaut.
pub const DIGITS_CONSTANTES: usize = 60;

/// Marge contre les erreurs de troncature des séries.
const EXTRA: usize = 10;

fn pow10(n: usize) -> BigInt {
    BigInt::from(10).pow(n as u32)
}

/// arctan(1/q) en entier scalé (troncature) via série:
/// atan(z) = z - z^3/3 + z^5/5 - ...
fn arctan_inv_q_scaled(q: i64, scale: &BigInt) -> BigInt {
    let q = BigInt::from(q);
    let q2 = &q * &q;

    let mut k: u64 = 0;
    let mut q_pow = q.clone(); // q^(2k+1)
    let mut sum = BigInt::zero();

    loop {
        let term = scale / (&q_pow * BigInt::from(2 * k + 1));
        if term.is_zero() {
            break;
        }

        if k % 2 == 0 {
            sum += &term;
        } else {
            sum -= &term;
        }

        q_pow *= &q2;
        k += 1;
    }

    sum
}

/// π tronqué à `digits` décimales (Machin : π = 16·atan(1/5) − 4·atan(1/239)).
pub fn pi(digits: usize) -> BigRational {
    let scale = pow10(digits + EXTRA);

    let a = arctan_inv_q_scaled(5, &scale);
    let b = arctan_inv_q_scaled(239, &scale);

    let pi = (BigInt::from(16) * a - BigInt::from(4) * b) / pow10(EXTRA);
    BigRational::new(pi, pow10(digits))
}

/// e tronqué à `digits` décimales (e = Σ 1/k!).
pub fn e(digits: usize) -> BigRational {
    let scale = pow10(digits + EXTRA);

    let mut sum = BigInt::zero();
    let mut term = scale; // scale / k!
    let mut k: u64 = 0;

    while !term.is_zero() {
        sum += &term;
        k += 1;
        term /= BigInt::from(k);
    }

    BigRational::new(sum / pow10(EXTRA), pow10(digits))
}
