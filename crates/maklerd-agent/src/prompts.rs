// SPDX-FileCopyrightText: 2026 Maklerd Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reference intents and their guided prompt sequences.
//!
//! When an utterance matches a reference intent, the session executes the
//! intent's German prompt steps through a scratch thread instead of passing
//! the utterance through verbatim. Intent order matters: ties during routing
//! resolve to the first-listed intent.

use maklerd_intent::ReferenceIntent;

pub const QUANTITATIVE_TARGET_STATUS: &str = "quantitative-target-status";
pub const PERSONAL_TARGET_ADVICE: &str = "personal-target-advice";
pub const PRODUCTIVE_BROKER_LIST: &str = "productive-broker-list";

/// The fixed, ordered set of routable reference intents.
pub fn reference_intents() -> Vec<ReferenceIntent> {
    vec![
        ReferenceIntent {
            name: QUANTITATIVE_TARGET_STATUS,
            text: "Wie ist meine aktuelle quantitative Zielerreichung?",
        },
        ReferenceIntent {
            name: PERSONAL_TARGET_ADVICE,
            text: "Wie erreiche ich meine persönlichen Ziele?",
        },
        ReferenceIntent {
            name: PRODUCTIVE_BROKER_LIST,
            text: "Welche Makler sind aktuell produktiv?",
        },
    ]
}

const ABTEILUNGSZIELE: &str = "Ermittle die Definition für die Zielart 1 Abteilungsziele und \
     wende diese Definition auf die vorliegenden Maklervertrieb Zahlen an. Erstelle daraus eine \
     Auflistung der Kennzahlen mit ihrem aktuellen Erreichungsgrad! Antworte möglichst \
     detailliert, da deine Antwort in anderen Abfragen als Input weiterverwendet werden soll.";

const TEAMZIELE: &str = "Ermittle die Definition für die Zielart 2 Teamziele und wende diese \
     Definition auf die vorliegenden Maklervertrieb Zahlen an. Erstelle daraus eine Auflistung \
     der Kennzahlen mit ihrem aktuellen Erreichungsgrad!";

const BESTANDSZIELE: &str = "Ermittle die Definition für die Messgröße Bestandsziele innerhalb \
     der Zielart 3 Persönliche Ziele und wende diese Definition auf die vorliegenden \
     Maklervertrieb Zahlen an. Erstelle daraus eine Auflistung der Makler, die diese \
     Zielvorgaben erreichen!";

const NEUGESCHAEFTSZIELE: &str = "Ermittle die Definition für die Messgröße Neu-/Mehrgeschäft \
     innerhalb der Zielart 3 Persönliche Ziele und wende diese Definition auf die vorliegenden \
     Maklervertrieb Zahlen an. Erstelle daraus eine Auflistung der Makler, die diese \
     Zielvorgaben erreichen!";

const PRODUKTIVE_MAKLER: &str = "Ermittle die Definition für die Messgröße Produktive Makler \
     innerhalb der Zielart 3 Persönliche Ziele und wende diese Definition auf die vorliegenden \
     Maklervertrieb Zahlen an. Erstelle daraus eine Auflistung der Makler, die diese \
     Zielvorgaben erreichen!";

const ZUSAMMENFASSUNG: &str = "Fasse die bisherigen Teilergebnisse zu einer Übersicht der \
     quantitativen Zielerreichung zusammen: Abteilungsziele, Teamziele, Bestandsziele, \
     Neu-/Mehrgeschäftsziele und Produktive Makler. Antworte auf Deutsch.";

const PERSOENLICHE_EMPFEHLUNG: &str = "Leite aus den bisherigen Teilergebnissen konkrete \
     Empfehlungen ab, wie der Account Manager seine persönlichen Ziele erreichen kann. \
     Berücksichtige dabei die Korrelationen zwischen den Zielarten. Antworte auf Deutsch.";

const PRODUKTIVE_ZUSAMMENFASSUNG: &str = "Erstelle aus dem bisherigen Teilergebnis eine kurze \
     Übersicht der aktuell produktiven Makler mit der angewendeten Definition. Antworte auf \
     Deutsch.";

/// The prompt steps executed for a matched intent, in order.
pub fn sequence_for(intent_name: &str) -> &'static [&'static str] {
    match intent_name {
        QUANTITATIVE_TARGET_STATUS => &[
            ABTEILUNGSZIELE,
            TEAMZIELE,
            BESTANDSZIELE,
            NEUGESCHAEFTSZIELE,
            PRODUKTIVE_MAKLER,
            ZUSAMMENFASSUNG,
        ],
        PERSONAL_TARGET_ADVICE => &[
            BESTANDSZIELE,
            NEUGESCHAEFTSZIELE,
            PRODUKTIVE_MAKLER,
            PERSOENLICHE_EMPFEHLUNG,
        ],
        PRODUCTIVE_BROKER_LIST => &[PRODUKTIVE_MAKLER, PRODUKTIVE_ZUSAMMENFASSUNG],
        _ => &[],
    }
}
