//! System instructions for the style rewrite step.
//!
//! The announcer product is Spanish-language: both instructions demand
//! Spanish output regardless of the input language.

use super::voice::AnnouncerStyle;

const EPIC_INSTRUCTION: &str = "\
Actúa como el locutor principal (\"Voice of God\") de un evento masivo de categoría mundial \
(como una final de boxeo en Las Vegas, los Oscars, o un concierto de estadio).

Tu tarea:
1. Reescribe el texto para que suene ÉPICO, DRAMÁTICO y EXAGERADO.
2. Usa un lenguaje que genere expectativa (Hype).
3. El texto debe ser corto pero impactante (máximo 2-3 frases potentes).
4. El resultado debe estar en ESPAÑOL.
5. NO incluyas guiones de diálogo tipo \"Locutor:\", solo dame el texto listo para leer.";

const PROFESSIONAL_INSTRUCTION: &str = "\
Actúa como un presentador profesional, sobrio y elegante (estilo noticias serias, \
evento corporativo de alto nivel o documental).

Tu tarea:
1. Toma el texto del usuario y púlelo LIGERAMENTE para que fluya bien al hablarse (oralidad).
2. MANTÉN EL SIGNIFICADO EXACTO. No agregues exageraciones ni drama.
3. Sé claro, conciso y respetuoso.
4. El resultado debe estar en ESPAÑOL.
5. Solo dame el texto listo para leer.";

/// The system instruction for a rewrite style.
///
/// `Real` returns `None`: that style bypasses the rewrite collaborator
/// entirely and announces the input verbatim.
pub fn system_instruction(style: AnnouncerStyle) -> Option<&'static str> {
    match style {
        AnnouncerStyle::Epic => Some(EPIC_INSTRUCTION),
        AnnouncerStyle::Professional => Some(PROFESSIONAL_INSTRUCTION),
        AnnouncerStyle::Real => None,
    }
}
