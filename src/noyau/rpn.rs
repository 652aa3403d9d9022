// src/noyau/rpn.rs
//
// Shunting-yard -> RPN -> AST
// Objectif:
// - Convertir une suite de Tok en RPN (postfix)
// - Puis reconstruire Expr
//
// Règles:
// - Précédences : + - (1) < * / (2) < moins unaire (3) < ^ (4)
// - ^ associatif à droite, les autres à gauche
// - Moins unaire : si '-' arrive quand on n’attend PAS une valeur => Tok::Neg
//   (préfixe : ne dépile rien). Donc -2^2 = -(2^2) et 5^-2 = 5^(-2).
// - Plus unaire : ignoré.
// - Fonctions : restent sur la pile sous leur '(' et sortent après ')'.
// - ')' manquante en fin : incident (ParentheseManquante), fermeture implicite.

use log::warn;

use super::erreur::Erreur;
use super::expr::Expr;
use super::jetons::{arite, Tok};

fn precedence(t: &Tok) -> i32 {
    match t {
        Tok::Plus | Tok::Minus => 1,
        Tok::Star | Tok::Slash => 2,
        Tok::Neg => 3,
        Tok::Caret => 4,
        _ => 0,
    }
}

fn is_right_associative(t: &Tok) -> bool {
    matches!(t, Tok::Caret)
}

fn est_operateur(t: &Tok) -> bool {
    precedence(t) > 0
}

fn invalide(msg: &str) -> Erreur {
    Erreur::ExpressionInvalide(msg.to_string())
}

/// Appel de fonction en cours (une entrée par '(' ouverte ; None = groupe simple).
struct Appel {
    nom: String,
    arguments: usize,
}

/// Dépile les opérateurs jusqu’à la '(' (laissée sur la pile).
fn vider_jusqua_lpar(ops: &mut Vec<Tok>, out: &mut Vec<Tok>) {
    while let Some(top) = ops.last() {
        if matches!(top, Tok::LPar) {
            break;
        }
        if let Some(t) = ops.pop() {
            out.push(t);
        }
    }
}

/// Ferme le groupe le plus interne (')' lue, ou implicite en fin d’entrée).
fn fermer_groupe(
    ops: &mut Vec<Tok>,
    out: &mut Vec<Tok>,
    appels: &mut Vec<Option<Appel>>,
    prev_was_value: bool,
) -> Result<(), Erreur> {
    vider_jusqua_lpar(ops, out);
    if !matches!(ops.pop(), Some(Tok::LPar)) {
        return Err(invalide("')' sans '(' correspondante"));
    }

    match appels.pop().flatten() {
        Some(mut appel) => {
            if prev_was_value {
                appel.arguments += 1;
            }
            let attendus = arite(&appel.nom).unwrap_or(0);
            if appel.arguments != attendus {
                return Err(Erreur::Arite {
                    fonction: appel.nom,
                    attendus,
                    recus: appel.arguments,
                });
            }
            // la fonction est juste sous sa '('
            if let Some(f @ Tok::Fonction(_)) = ops.pop() {
                out.push(f);
            }
        }
        None => {
            if !prev_was_value {
                return Err(invalide("parenthèses vides"));
            }
        }
    }
    Ok(())
}

/// Convertit une suite de jetons en RPN (notation polonaise inversée).
///
/// Les fautes récupérées (parenthèse manquante) sont ajoutées à `incidents`.
///
/// Exemple:
///   tokens: [Mot("2"), Plus, Mot("3"), Star, Mot("4")]
///   rpn:    [Mot("2"), Mot("3"), Mot("4"), Star, Plus]
pub fn to_rpn(tokens: &[Tok], incidents: &mut Vec<Erreur>) -> Result<Vec<Tok>, Erreur> {
    let mut out: Vec<Tok> = Vec::new();
    let mut ops: Vec<Tok> = Vec::new();
    let mut appels: Vec<Option<Appel>> = Vec::new();

    // “valeur” = un atome ou une expression fermée.
    // Sert à détecter le moins unaire (et les opérandes manquants).
    let mut prev_was_value = false;

    for tok in tokens.iter().cloned() {
        match tok {
            Tok::Mot(_) => {
                if prev_was_value {
                    return Err(invalide("deux valeurs se suivent sans opérateur"));
                }
                out.push(tok);
                prev_was_value = true;
            }

            Tok::Fonction(_) => {
                if prev_was_value {
                    return Err(invalide("valeur suivie d’une fonction sans opérateur"));
                }
                ops.push(tok);
                prev_was_value = false;
            }

            Tok::LPar => {
                if prev_was_value {
                    return Err(invalide("valeur suivie de '(' sans opérateur"));
                }
                let appel = match ops.last() {
                    Some(Tok::Fonction(nom)) => Some(Appel {
                        nom: nom.clone(),
                        arguments: 0,
                    }),
                    _ => None,
                };
                appels.push(appel);
                ops.push(tok);
                prev_was_value = false;
            }

            Tok::Virgule => {
                if !prev_was_value {
                    return Err(invalide("argument vide"));
                }
                vider_jusqua_lpar(&mut ops, &mut out);
                match appels.last_mut() {
                    Some(Some(appel)) => appel.arguments += 1,
                    _ => return Err(invalide("',' hors d’un appel de fonction")),
                }
                prev_was_value = false;
            }

            Tok::RPar => {
                if appels.is_empty() {
                    return Err(invalide("')' sans '(' correspondante"));
                }
                fermer_groupe(&mut ops, &mut out, &mut appels, prev_was_value)?;
                prev_was_value = true;
            }

            // unaires
            Tok::Plus if !prev_was_value => {}
            Tok::Minus if !prev_was_value => ops.push(Tok::Neg),

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                if !prev_was_value {
                    return Err(invalide("opérande manquant avant un opérateur"));
                }

                // dépile tant que:
                // - on n'est pas bloqué par '(' (ni par une fonction)
                // - et la précédence/associativité exige de sortir l'opérateur du haut
                while let Some(top) = ops.last() {
                    if !est_operateur(top) {
                        break;
                    }

                    let p_top = precedence(top);
                    let p_tok = precedence(&tok);

                    let doit_pop = if is_right_associative(&tok) {
                        p_top > p_tok
                    } else {
                        p_top >= p_tok
                    };

                    if !doit_pop {
                        break;
                    }
                    if let Some(t) = ops.pop() {
                        out.push(t);
                    }
                }

                ops.push(tok);
                prev_was_value = false;
            }

            Tok::Neg => return Err(invalide("jeton interne inattendu")),
        }
    }

    if !tokens.is_empty() && !prev_was_value {
        return Err(invalide("opérande manquant en fin d’expression"));
    }

    // ')' manquantes : fermeture implicite en fin d’entrée
    while !appels.is_empty() {
        let e = Erreur::ParentheseManquante;
        warn!("{e}");
        incidents.push(e);
        fermer_groupe(&mut ops, &mut out, &mut appels, true)?;
    }

    // vide la pile ops
    while let Some(op) = ops.pop() {
        out.push(op);
    }

    Ok(out)
}

/// Garde-fou : profondeur maximale de l’arbre (feuille = 1).
///
/// L’évaluation, l’affichage et la libération d’un `Expr` sont récursifs.
pub const PROFONDEUR_MAX: usize = 256;

fn noeud(e: Expr, profondeur: usize) -> Result<(Expr, usize), Erreur> {
    if profondeur > PROFONDEUR_MAX {
        return Err(invalide("expression trop profonde"));
    }
    Ok((e, profondeur))
}

/// Construit une Expr à partir d’une RPN.
pub fn from_rpn(rpn: &[Tok]) -> Result<Expr, Erreur> {
    // chaque entrée porte la profondeur de son sous-arbre
    let mut st: Vec<(Expr, usize)> = Vec::new();
    let manque = || invalide("opérande manquant");

    for tok in rpn.iter().cloned() {
        match tok {
            Tok::Mot(m) => st.push((Expr::Litteral(m), 1)),

            Tok::Neg => {
                let (a, p) = st.pop().ok_or_else(manque)?;
                st.push(noeud(Expr::Neg(Box::new(a)), p + 1)?);
            }

            Tok::Plus | Tok::Minus | Tok::Star | Tok::Slash | Tok::Caret => {
                let (b, pb) = st.pop().ok_or_else(manque)?;
                let (a, pa) = st.pop().ok_or_else(manque)?;
                let (a, b) = (Box::new(a), Box::new(b));

                let e = match tok {
                    Tok::Plus => Expr::Add(a, b),
                    Tok::Minus => Expr::Sub(a, b),
                    Tok::Star => Expr::Mul(a, b),
                    Tok::Slash => Expr::Div(a, b),
                    _ => Expr::Pow(a, b),
                };
                st.push(noeud(e, 1 + pa.max(pb))?);
            }

            Tok::Fonction(nom) => {
                let entree = match nom.as_str() {
                    "sqrt" => {
                        let (x, p) = st.pop().ok_or_else(manque)?;
                        noeud(Expr::Sqrt(Box::new(x)), p + 1)?
                    }
                    "root" => {
                        let (n, pn) = st.pop().ok_or_else(manque)?;
                        let (x, px) = st.pop().ok_or_else(manque)?;
                        noeud(Expr::Root(Box::new(x), Box::new(n)), 1 + px.max(pn))?
                    }
                    _ => return Err(Erreur::FonctionInconnue(nom)),
                };
                st.push(entree);
            }

            Tok::LPar | Tok::RPar | Tok::Virgule => {
                return Err(invalide("parenthèse inattendue en RPN"))
            }
        }
    }

    match (st.pop(), st.is_empty()) {
        (Some((e, _)), true) => Ok(e),
        _ => Err(invalide("expression vide ou incomplète")),
    }
}
