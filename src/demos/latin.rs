//! Latin vocabulary with Dutch translations, the first chapters of a school course.

use std::path::{Path, PathBuf};

use crate::builder::{FlashcardBuilder, FlashcardError};

/// Default file name of the rendered deck.
pub const OUTPUT: &str = "Latin.pdf";

/// `(original, translation, extra, index)` for every card, in course order.
pub const ENTRIES: &[(&str, &str, &str, &str)] = &[
    ("amicus", "de vriend", "*amici, m *", "1"),
    ("deus", "de god", "*dei, m*", "2"),
    ("dominus", "de meester", "*domini, m*", "3"),
    ("equus", "het paard", "*equi, m*", "4"),
    ("filius", "de zoon", "*filii, m*", "5"),
    ("servus", "de slaaf", "*servi, m*", "6"),
    ("aqua", "het water", "*aquae, v*", "7"),
    ("familia", "het gezin, het personeel", "*familiae, v*", "8"),
    ("via", "de weg ", "*viae, v*", "9"),
    ("monumentum", "het monument, het aandenken", "*monumenti, o*", "10"),
    ("templum", "de tempel", "*templi, o*", "11"),
    ("vinum", "de wijn", "*vini, o*", "12"),
    ("pater", "de vader", "*patr-is, m*", "13"),
    ("senex", "de oude man", "*sen-is, m*", "14"),
    ("virgo", "de maagd, het meisje", "*virgin-is, v*", "15"),
    ("vox", "de stem, het woord", "*voc-is, v*", "16"),
    ("flumen", "de rivier", "*flumin-is, o*", "17"),
    ("sidus", "de ster", "*sider-is, o*", "18"),
    ("amica", "de vriendin", "*amicae, v*", "p3"),
    ("dea", "de godin", "*deae, v*", "p3"),
    ("domina", "de meesteres", "*dominae, v*", "p3"),
    ("filia", "de dochter", "*filiae, v*", "p3"),
    ("serva", "de slavin", "*servae, v*", "p3"),
    ("femina", "de vrouw", "*feminae, v*", "19"),
    ("canis", "de hond", "*can-is, m*", "20"),
    ("iuvenis", "de jongeman", "*iuven-is, m*", "21"),
    ("mercator", "de handelaar", "*mercator-is, m*", "22"),
    ("miles", "de soldaat", "*milit-is, m*", "23"),
    ("senator", "de senator", "*senator-is, m*", "24"),
    ("nox", "de nacht", "*noct-is, v*", "25"),
    ("caput", "het hoofd, het hoofdstuk", "*capit-is*", "26"),
    ("est", "(hij, zij, het, er) is", "*(werkwoord)*", "27"),
    ("sunt", "(zij, er) zijn", "*(werkwoord)*", "28"),
    ("ibi", "daar", "*(bijwoord)*", "29"),
    ("saepe", "dikwijls", "*(bijwoord)*", "30"),
    ("aut", "of", "*(voegwoord)*", "31"),
    ("et", "en, ook", "*(voegwoord)*", "32"),
    ("-que", "en", "*(voegwoord)*", "33"),
    ("sed", "maar", "*(voegwoord)*", "34"),
    ("avus", "de grootvader", "*avi, m*", "35"),
    ("rosa", "de roos", "*rosae, v*", "36"),
    ("donum", "het geschenk", "*doni, o*", "37"),
    ("dux", "de leider", "*duc-is, m*", "38"),
    ("mater", "de moeder", "*matr-is, v*", "39"),
    ("corpus", "het lichaam", "*corpor-is, o*", "40"),
    ("iam", "al, dadelijk", "*(bijwoord)*", "41"),
    ("interdum", "soms", "*(bijwoord)*", "42"),
    ("quoque", "ook", "*(bijwoord)*", "43"),
    ("enim", "want", "*(voegwoord)*", "44"),
    ("curia", "de curia (Romeinse senaatsgebouw)", "*curiae, v*", "45"),
    ("fabula", "het verhaal, het toneelstuk", "*fabulae, v*", "46"),
    ("luna", "de maan", "*lunae, v*", "47"),
    ("forum", "het forum (Romeinse marktplein)", "*fori, o*", "48"),
    ("iudex", "de rechter", "*iudic-is, m*", "49"),
    ("onus", "de last", "*oner-is, o*", "50"),
    ("tempus", "de tijd, het moment", "*tempor-is, o*", "51"),
    ("non", "niet", "*(ontkenning)*", "52"),
    ("semper", "altijd", "*(bijwoord)*", "53"),
    ("statua", "het standbeeld", "*statuae, v*", "54"),
    ("eques", "de ruiter, de ridder", "*equit-is, m*", "55"),
    ("laborare", "werken, lijden", "*laboro*", "56"),
    ("apparere", "verschijnen, blijken", "*appareo*", "57"),
    ("dormire", "slapen", "*dormio*", "58"),
    ("domi", "thuis", "*(bijwoord)*", "59"),
    ("etiam", "ook, zelfs", "*(bijwoord)*", "60"),
    ("nondum", "nog niet", "*(bijwoord)*", "61"),
    ("non iam", "niet meer", "*(bijwoord)*", "62"),
    ("nunc", "nu", "*(bijwoord)*", "63"),
];

/// Returns a builder holding the whole vocabulary, writing to [`OUTPUT`].
pub fn latin_builder() -> FlashcardBuilder {
    ENTRIES
        .iter()
        .fold(
            FlashcardBuilder::new().with_title("Latin vocabulary"),
            |builder, &(original, translation, extra, index)| {
                builder.add_entry(original, translation, extra, index)
            },
        )
        .with_output(OUTPUT)
}

/// Renders the deck to `output`, or to [`OUTPUT`] when none is given.
pub fn run(output: Option<&Path>) -> Result<PathBuf, FlashcardError> {
    let mut builder = latin_builder();
    if let Some(path) = output {
        builder = builder.with_output(path);
    }
    builder.generate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Side;

    #[test]
    fn builder_keeps_course_order() {
        let builder = latin_builder();
        let deck = builder.deck();
        assert_eq!(deck.len(), ENTRIES.len());
        assert_eq!(deck.entries()[0].original().markup(), "amicus");
        assert_eq!(deck.entries()[0].extra().markup(), "<i>amici, m </i>");
        assert_eq!(builder.output(), Path::new(OUTPUT));
    }

    #[test]
    fn vocabulary_fills_two_sheets() {
        let pages = latin_builder().pages().expect("default layout is valid");
        assert_eq!(pages.len(), 4);
        assert_eq!(pages[0].side(), Side::Front);
        assert_eq!(pages[3].side(), Side::Back);
        assert_eq!(pages[2].row_lengths(), vec![5, 5]);
    }
}
