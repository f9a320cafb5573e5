//! # Recuperação de Offsets e Fusão entre Janelas
//!
//! Traduz spans locais de cada janela para coordenadas globais do documento
//! (`global = local + janela.offset`) e funde as listas de todas as janelas
//! em uma única lista global.
//!
//! Como janelas vizinhas se sobrepõem, a mesma entidade pode ser decodificada
//! duas vezes na zona de sobreposição, possivelmente com fronteiras
//! divergentes (uma das janelas a vê truncada na borda). A fusão percorre as
//! janelas na ordem de produção e aceita cada span recuperado apenas se não
//! intersectar nenhum já aceito: a primeira janela vence, duplicatas exatas
//! caem junto, e o invariante flat (nenhum par sobreposto) vale na lista
//! final.

use crate::entity::Entity;

/// Traduz spans locais de uma janela para coordenadas do documento.
///
/// Tradução pura, O(número de entidades); não reordena nem filtra.
pub fn recover_offsets(mut entities: Vec<Entity>, offset: usize) -> Vec<Entity> {
    for e in &mut entities {
        e.start += offset;
        e.end += offset;
    }
    entities
}

/// Funde listas de entidades já recuperadas, na ordem das janelas.
///
/// A saída é ordenada por `(start, end)` e livre de sobreposições.
pub fn merge_entities<I>(recovered: I) -> Vec<Entity>
where
    I: IntoIterator<Item = Vec<Entity>>,
{
    let mut accepted: Vec<Entity> = Vec::new();
    for window_entities in recovered {
        for entity in window_entities {
            if !accepted.iter().any(|e| e.overlaps(&entity)) {
                accepted.push(entity);
            }
        }
    }
    accepted.sort_by(|a, b| (a.start, a.end).cmp(&(b.start, b.end)));
    accepted
}
