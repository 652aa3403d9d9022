// src/noyau/jetons.rs

use super::erreur::Erreur;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Tok {
    // Chiffres (dans la base d’entrée) ou nom lié : décidé à l’évaluation.
    Mot(String),

    // Nom de fonction connue, toujours suivi de LPar.
    Fonction(String),

    Plus,
    Minus,
    Star,
    Slash,
    Caret, // ^

    // Moins unaire : jamais produit par tokenize, seulement par to_rpn.
    Neg,

    LPar,
    RPar,
    Virgule, // séparateur d’arguments (dans un appel seulement)
}

/// Fonctions reconnues et leur nombre d’arguments.
pub fn arite(nom: &str) -> Option<usize> {
    match nom {
        "root" => Some(2),
        "sqrt" => Some(1),
        _ => None,
    }
}

/// Caractère admis dans un mot : chiffres étendus, lettres, _, $, séparateur.
fn est_car_mot(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$' || c == '.' || c == ','
}

/// Tokenize une chaîne en jetons.
/// Supporte:
/// - mots : chiffres de toute base ≤ 42 (ex: 1F.8, 0,5) ou noms (x, pi, $precision)
/// - opérateurs + - * / ^
/// - parenthèses ( )
/// - appels root(a, b) et sqrt(a) (insensibles à la casse, espaces permis avant '(')
/// - ',' : séparateur d’arguments dans un appel, sinon séparateur décimal
pub fn tokenize(s: &str) -> Result<Vec<Tok>, Erreur> {
    let mut out = Vec::new();
    let chars: Vec<char> = s.chars().collect();
    let mut i: usize = 0;

    // Pour chaque '(' ouverte : est-ce la parenthèse d’un appel ?
    let mut appels: Vec<bool> = Vec::new();

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }

        // Parenthèses
        if c == '(' {
            appels.push(matches!(out.last(), Some(Tok::Fonction(_))));
            out.push(Tok::LPar);
            i += 1;
            continue;
        }
        if c == ')' {
            appels.pop();
            out.push(Tok::RPar);
            i += 1;
            continue;
        }

        let dans_appel = appels.last() == Some(&true);
        if c == ',' && dans_appel {
            out.push(Tok::Virgule);
            i += 1;
            continue;
        }

        // Opérateurs
        let op = match c {
            '+' => Some(Tok::Plus),
            '-' => Some(Tok::Minus),
            '*' => Some(Tok::Star),
            '/' => Some(Tok::Slash),
            '^' => Some(Tok::Caret),
            _ => None,
        };
        if let Some(op) = op {
            out.push(op);
            i += 1;
            continue;
        }

        // Mot : [chiffres|lettres|_|$|.|,]+ (',' coupe le mot dans un appel)
        if est_car_mot(c) {
            let start = i;
            while i < chars.len() && est_car_mot(chars[i]) && !(dans_appel && chars[i] == ',') {
                i += 1;
            }
            let mot: String = chars[start..i].iter().collect();

            let mut j = i;
            while j < chars.len() && chars[j].is_whitespace() {
                j += 1;
            }
            let suivi_de_par = j < chars.len() && chars[j] == '(';
            let nom = mot.to_lowercase();

            if suivi_de_par && arite(&nom).is_some() {
                out.push(Tok::Fonction(nom));
            } else if j == i && suivi_de_par && mot.starts_with(|c: char| c.is_alphabetic()) {
                // f(…) collé : appel d’une fonction qui n’existe pas
                return Err(Erreur::FonctionInconnue(mot));
            } else {
                out.push(Tok::Mot(mot));
            }
            continue;
        }

        return Err(Erreur::CaractereInattendu(c));
    }

    Ok(out)
}

/// Format utilitaire (“démarche”) : liste de jetons en texte.
pub fn format_tokens(tokens: &[Tok]) -> String {
    let mut out = Vec::new();
    for t in tokens {
        let s = match t {
            Tok::Mot(m) => m.clone(),
            Tok::Fonction(name) => name.clone(),

            Tok::Plus => "+".to_string(),
            Tok::Minus => "-".to_string(),
            Tok::Star => "*".to_string(),
            Tok::Slash => "/".to_string(),
            Tok::Caret => "^".to_string(),
            Tok::Neg => "neg".to_string(),

            Tok::LPar => "(".to_string(),
            Tok::RPar => ")".to_string(),
            Tok::Virgule => ",".to_string(),
        };
        out.push(s);
    }
    out.join(" ")
}
